//! Port definitions for the application layer
//!
//! Ports are interfaces the cache consumes. Adapters in the infrastructure
//! layer implement them against the real store; tests implement them with
//! mocks.

mod cache_store;
mod generation_port;

#[cfg(test)]
pub use cache_store::MockCacheStorePort;
pub use cache_store::CacheStorePort;
#[cfg(test)]
pub use generation_port::MockGenerationPort;
pub use generation_port::{GenerationOptions, GenerationPort};
