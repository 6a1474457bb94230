//! Infrastructure layer for the ClosetIQ response cache
//!
//! Implements the application ports against real backends: a sqlx/SQLite
//! cache store, an optional in-memory L1 layer, configuration loading,
//! maintenance task factories, and the bootstrap that wires them together.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod maintenance;
pub mod persistence;

pub use bootstrap::CacheStack;
