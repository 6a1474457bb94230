//! Application layer for the ClosetIQ response cache
//!
//! Defines the ports the cache consumes (persisted store, AI generator) and
//! the services that implement fingerprinting, key composition, lookup,
//! storage, invalidation, and request deduplication.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
