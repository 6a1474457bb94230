//! Factory functions for scheduled cache maintenance
//!
//! Provides pre-built task closures for whatever scheduler the deployment
//! runs (cron-style, tokio interval, serverless timer). The eviction task
//! is designed to run hourly by default.

use std::{sync::Arc, time::Duration};

use application::services::ResponseCacheService;
use futures::future::BoxFuture;
use tracing::{debug, info};

/// Task name for the cache eviction job
pub const CACHE_EVICTION_TASK: &str = "cache_eviction";

/// Create a cache eviction task closure
///
/// Each run bulk-deletes entries older than `max_age`, optionally limited
/// to entries that were never read. Eviction failures are already absorbed
/// by the service, so the task itself never fails.
pub fn create_cache_eviction_task(
    cache: Arc<ResponseCacheService>,
    max_age: Duration,
    only_unused: bool,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let cache = Arc::clone(&cache);
        Box::pin(async move {
            debug!("Running cache eviction");
            let deleted = cache.evict_expired(max_age, only_unused).await;
            if deleted > 0 {
                info!(deleted, "Cache eviction pass complete");
            } else {
                debug!("No expired cache entries");
            }
            Ok(())
        })
    }
}
