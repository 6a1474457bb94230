//! L1 in-memory layer over a persisted cache store
//!
//! A moka read-through/write-through front for any cache store port. The
//! persisted store stays authoritative: access bookkeeping and deletions go
//! to the inner store first and then drop the L1 copy, so a stale L1 entry
//! can only ever lag on `access_count`, which no correctness decision
//! reads. Losing the whole layer on restart is fine.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use application::{error::ApplicationError, ports::CacheStorePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CacheEntry, UserId};
use moka::future::Cache;
use tracing::{debug, instrument};

/// Configuration for the L1 layer
#[derive(Debug, Clone, Copy)]
pub struct LayeredCacheStoreConfig {
    /// Maximum number of entries held in memory
    pub max_entries: u64,
    /// How long an L1 copy lives before it must be re-read
    pub time_to_live: Duration,
}

impl Default for LayeredCacheStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            time_to_live: Duration::from_secs(30 * 60),
        }
    }
}

/// Cache store with an in-memory L1 in front of the persisted table
pub struct LayeredCacheStore {
    inner: Arc<dyn CacheStorePort>,
    l1: Cache<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl fmt::Debug for LayeredCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredCacheStore")
            .field("l1_entries", &self.l1.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl LayeredCacheStore {
    /// Wrap a store with the default L1 configuration
    #[must_use]
    pub fn new(inner: Arc<dyn CacheStorePort>) -> Self {
        Self::with_config(inner, LayeredCacheStoreConfig::default())
    }

    /// Wrap a store with a custom L1 configuration
    #[must_use]
    pub fn with_config(inner: Arc<dyn CacheStorePort>, config: LayeredCacheStoreConfig) -> Self {
        Self {
            inner,
            l1: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.time_to_live)
                .build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// L1 hits and misses since construction
    #[must_use]
    pub fn l1_stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    fn l1_key(user_id: &UserId, request_hash: &str) -> String {
        format!("{user_id}:{request_hash}")
    }
}

#[async_trait]
impl CacheStorePort for LayeredCacheStore {
    #[instrument(skip(self), fields(user = %user_id), level = "debug")]
    async fn fetch(
        &self,
        user_id: &UserId,
        request_hash: &str,
    ) -> Result<Option<CacheEntry>, ApplicationError> {
        let key = Self::l1_key(user_id, request_hash);
        if let Some(entry) = self.l1.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(layer = "L1", "Cache store hit");
            return Ok(Some(entry));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let fetched = self.inner.fetch(user_id, request_hash).await?;
        if let Some(entry) = &fetched {
            self.l1.insert(key, entry.clone()).await;
            debug!(layer = "L2", "Cache store hit, promoted to L1");
        }
        Ok(fetched)
    }

    async fn insert(&self, entry: &CacheEntry) -> Result<(), ApplicationError> {
        // Inner first: an L1 copy of a row that failed to persist would
        // serve phantom hits.
        self.inner.insert(entry).await?;
        let key = Self::l1_key(&entry.user_id, &entry.request_hash);
        self.l1.insert(key, entry.clone()).await;
        Ok(())
    }

    async fn record_access(
        &self,
        user_id: &UserId,
        request_hash: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        self.inner
            .record_access(user_id, request_hash, accessed_at)
            .await?;
        // Drop the L1 copy rather than patching it; the next fetch
        // repopulates with the authoritative counters.
        self.l1
            .invalidate(&Self::l1_key(user_id, request_hash))
            .await;
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &UserId,
        request_hash: &str,
    ) -> Result<(), ApplicationError> {
        self.inner.delete(user_id, request_hash).await?;
        self.l1
            .invalidate(&Self::l1_key(user_id, request_hash))
            .await;
        Ok(())
    }

    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        only_unused: bool,
    ) -> Result<u64, ApplicationError> {
        let deleted = self.inner.delete_older_than(cutoff, only_unused).await?;
        if deleted > 0 {
            // Coarse but safe: bulk deletion is rare and the layer refills.
            self.l1.invalidate_all();
        }
        Ok(deleted)
    }
}
