//! Wired cache stack
//!
//! Assembles the persisted store, the optional L1 layer, and the cache
//! service from loaded settings. Deployments embed this in whatever runtime
//! they have (HTTP server, serverless handler, worker); the stack itself
//! owns no scheduler and no generator.

use std::sync::Arc;

use application::{
    ports::{CacheStorePort, GenerationPort},
    services::{CachedGenerationService, InvalidationPolicy, ResponseCacheService},
};
use futures::future::BoxFuture;
use tracing::info;

use crate::{
    cache::{LayeredCacheStore, LayeredCacheStoreConfig},
    config::Settings,
    maintenance::create_cache_eviction_task,
    persistence::{AsyncDatabase, AsyncDatabaseError, SqliteCacheStore},
};

/// The assembled cache subsystem
#[derive(Debug)]
pub struct CacheStack {
    database: AsyncDatabase,
    cache: Arc<ResponseCacheService>,
    settings: Settings,
}

impl CacheStack {
    /// Build the stack from settings: pool, migrations, store, service
    ///
    /// With `l1_max_entries > 0` the persisted store gets an in-memory
    /// read-through layer in front; zero disables the layer entirely.
    pub async fn build(settings: Settings) -> Result<Self, AsyncDatabaseError> {
        let database = AsyncDatabase::new(&settings.database.to_async_config()).await?;
        database.migrate().await?;

        let sqlite = SqliteCacheStore::new(database.pool().clone());
        let store: Arc<dyn CacheStorePort> = if settings.cache.l1_max_entries > 0 {
            Arc::new(LayeredCacheStore::with_config(
                Arc::new(sqlite),
                LayeredCacheStoreConfig {
                    max_entries: settings.cache.l1_max_entries,
                    ..LayeredCacheStoreConfig::default()
                },
            ))
        } else {
            Arc::new(sqlite)
        };

        let policy = InvalidationPolicy::new(settings.cache.max_age());
        let cache = Arc::new(ResponseCacheService::with_policy(store, policy));

        info!(
            enabled = settings.cache.enabled,
            max_age_secs = settings.cache.max_age_secs,
            l1_max_entries = settings.cache.l1_max_entries,
            "Cache stack assembled"
        );

        Ok(Self {
            database,
            cache,
            settings,
        })
    }

    /// The cache service request handlers talk to
    #[must_use]
    pub fn cache(&self) -> Arc<ResponseCacheService> {
        Arc::clone(&self.cache)
    }

    /// The settings the stack was built from
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The database pool behind the store
    #[must_use]
    pub const fn database(&self) -> &AsyncDatabase {
        &self.database
    }

    /// Wrap a generator with this stack's cache, honoring the enabled flag
    #[must_use]
    pub fn generation_service(&self, generator: Arc<dyn GenerationPort>) -> CachedGenerationService {
        let service = CachedGenerationService::new(self.cache(), generator);
        if self.settings.cache.enabled {
            service
        } else {
            service.with_caching_disabled()
        }
    }

    /// Eviction task closure for the deployment's scheduler
    ///
    /// Runs with the configured age limit and unused-only flag; intended to
    /// fire every `settings.cache.eviction_interval()`.
    #[must_use]
    pub fn eviction_task(
        &self,
    ) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
        create_cache_eviction_task(
            self.cache(),
            self.settings.cache.max_age(),
            self.settings.cache.evict_unused_only,
        )
    }

    /// Close the underlying pool
    pub async fn shutdown(&self) {
        self.database.close().await;
    }
}
