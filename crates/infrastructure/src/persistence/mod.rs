//! Persistence adapters

mod async_connection;
mod sqlite_cache_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use sqlite_cache_store::SqliteCacheStore;
