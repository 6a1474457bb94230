//! Cache store decorators

mod layered_store;

pub use layered_store::{LayeredCacheStore, LayeredCacheStoreConfig};
