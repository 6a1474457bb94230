//! Response cache service - lookup, store, and eviction over the store port
//!
//! Failure policy per the error design: the store being down, a malformed
//! row, or a duplicate insert must never surface to the request path. Every
//! failure degrades to a cache miss (or a `false` store result) and a log
//! line; the worst case is one unnecessary generator call.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{
    CacheEntry, PromptType, RequestContext, Season, UserContext, UserId, WardrobeEvolution,
    week_bucket,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    cache_key::{CacheKeyMetrics, CacheRequest, ComposedCacheKey, compose_key},
    fingerprint::ContextFingerprint,
    invalidation::InvalidationPolicy,
};
use crate::ports::CacheStorePort;

/// Result of a cache lookup
///
/// `cached` is false on a true miss, an invalidated entry, and any store
/// failure; callers cannot and should not distinguish those cases.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    /// The stored response on a validated hit
    pub data: Option<Value>,
    /// Whether this was a validated hit
    pub cached: bool,
    /// Key metrics recorded at write time, when the row carried them
    pub metrics: Option<CacheKeyMetrics>,
}

impl CacheLookup {
    fn miss() -> Self {
        Self {
            data: None,
            cached: false,
            metrics: None,
        }
    }
}

/// Seasonal situation captured at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalSnapshot {
    /// Season when the entry was written; drives seasonal invalidation
    pub season: Season,
    /// Week bucket when the entry was written
    pub week_bucket: u32,
}

/// Snapshot of the inputs that produced a cached response
///
/// Persisted as the row's `request_data`. The seasonal part is read back by
/// the invalidation policy; everything else is diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSnapshot {
    /// The AI task
    pub prompt_type: PromptType,
    /// How many items the request covered
    pub item_count: usize,
    /// The request context as received
    pub context: RequestContext,
    /// The user context as received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,
    /// Season and week bucket at write time
    pub seasonal_context: SeasonalSnapshot,
    /// Wardrobe evolution at write time, kept separately for analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wardrobe_evolution: Option<WardrobeEvolution>,
    /// The key's diagnostic metrics
    pub metrics: CacheKeyMetrics,
    /// The five signal-group digests behind the key
    pub fingerprint: ContextFingerprint,
}

/// The context-aware response cache
pub struct ResponseCacheService {
    store: Arc<dyn CacheStorePort>,
    policy: InvalidationPolicy,
}

impl fmt::Debug for ResponseCacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCacheService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ResponseCacheService {
    /// Create a service with the default invalidation policy
    #[must_use]
    pub fn new(store: Arc<dyn CacheStorePort>) -> Self {
        Self {
            store,
            policy: InvalidationPolicy::default(),
        }
    }

    /// Create a service with a custom invalidation policy
    #[must_use]
    pub fn with_policy(store: Arc<dyn CacheStorePort>, policy: InvalidationPolicy) -> Self {
        Self { store, policy }
    }

    /// Compose the context-aware cache key for a request
    #[must_use]
    pub fn compose_key(&self, request: &CacheRequest<'_>) -> ComposedCacheKey {
        compose_key(request, Utc::now())
    }

    /// Look up a key for a user
    ///
    /// A found row is validated against the invalidation policy; invalid
    /// rows are deleted and reported as misses. Validated hits bump the
    /// access counter.
    #[instrument(skip(self, user_context), fields(user = %user_id, key = %key))]
    pub async fn lookup(
        &self,
        key: &str,
        user_id: &UserId,
        user_context: Option<&UserContext>,
    ) -> CacheLookup {
        let entry = match self.store.fetch(user_id, key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("Cache miss");
                return CacheLookup::miss();
            },
            Err(e) => {
                // Store trouble is never the caller's problem.
                warn!(error = %e, "Cache fetch failed, treating as miss");
                return CacheLookup::miss();
            },
        };

        let now = Utc::now();
        let verdict = self.policy.evaluate(&entry, user_context, now);
        if !verdict.is_valid() {
            debug!(?verdict, "Cache entry invalidated");
            if let Err(e) = self.store.delete(user_id, key).await {
                warn!(error = %e, "Failed to delete invalidated entry");
            }
            return CacheLookup::miss();
        }

        if let Err(e) = self.store.record_access(user_id, key, now).await {
            // The hit still counts; only the bookkeeping is lost.
            warn!(error = %e, "Failed to record cache access");
        }

        debug!(access_count = entry.access_count + 1, "Cache hit");
        let metrics = entry
            .request_data
            .get("metrics")
            .cloned()
            .and_then(|m| serde_json::from_value(m).ok());
        CacheLookup {
            data: Some(entry.response),
            cached: true,
            metrics,
        }
    }

    /// Store a freshly generated response under a composed key
    ///
    /// Returns whether the write succeeded. A duplicate key means another
    /// request generated the same response concurrently; the caller's copy
    /// is still good, so this is logged and reported as `false` rather
    /// than raised.
    #[instrument(skip_all, fields(user = %request.user_id, key = %key.key))]
    pub async fn store_response(
        &self,
        key: &ComposedCacheKey,
        request: &CacheRequest<'_>,
        response: Value,
    ) -> bool {
        let now = Utc::now();
        let snapshot = RequestSnapshot {
            prompt_type: request.prompt_type,
            item_count: request.items.len(),
            context: request.context.clone(),
            user_context: request.user_context.cloned(),
            seasonal_context: SeasonalSnapshot {
                season: Season::from_datetime(now),
                week_bucket: week_bucket(now),
            },
            wardrobe_evolution: request
                .user_context
                .and_then(|u| u.wardrobe_evolution.clone()),
            metrics: key.metrics,
            fingerprint: key.fingerprint.clone(),
        };

        let request_data = match serde_json::to_value(&snapshot) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize request snapshot");
                return false;
            },
        };

        let entry = CacheEntry::new(
            request.user_id.clone(),
            key.key.clone(),
            request_data,
            response,
            now,
        );

        match self.store.insert(&entry).await {
            Ok(()) => {
                debug!("Cached response stored");
                true
            },
            Err(e) if e.is_duplicate_entry() => {
                debug!("Duplicate cache entry, concurrent generation already stored");
                false
            },
            Err(e) => {
                warn!(error = %e, "Failed to store cached response");
                false
            },
        }
    }

    /// Bulk-delete entries older than `max_age`
    ///
    /// With `only_unused`, restricts to entries never read. Returns the
    /// number deleted; store failures are logged and reported as zero.
    #[instrument(skip(self))]
    pub async fn evict_expired(&self, max_age: std::time::Duration, only_unused: bool) -> u64 {
        let cutoff = cutoff_before(Utc::now(), max_age);
        match self.store.delete_older_than(cutoff, only_unused).await {
            Ok(0) => 0,
            Ok(deleted) => {
                info!(deleted, only_unused, "Evicted expired cache entries");
                deleted
            },
            Err(e) => {
                warn!(error = %e, "Cache eviction failed");
                0
            },
        }
    }
}

/// The instant `max_age` before `now`, clamped on overflow
fn cutoff_before(now: DateTime<Utc>, max_age: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use domain::{CacheStrategy, ClothingItem, WardrobeEvolution};
    use serde_json::json;

    use super::*;
    use crate::ports::MockCacheStorePort;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn wardrobe() -> Vec<ClothingItem> {
        vec![
            ClothingItem::new("a", "Tops").with_color("Black"),
            ClothingItem::new("b", "Bottoms").with_color("Blue"),
        ]
    }

    fn work_context() -> RequestContext {
        RequestContext {
            occasion: Some("work".to_string()),
            ..RequestContext::default()
        }
    }

    fn request<'a>(
        user_id: &'a UserId,
        items: &'a [ClothingItem],
        context: &'a RequestContext,
        user_context: Option<&'a UserContext>,
    ) -> CacheRequest<'a> {
        CacheRequest {
            user_id,
            items,
            context,
            prompt_type: PromptType::OutfitGeneration,
            user_context,
            strategy: CacheStrategy::Balanced,
        }
    }

    fn valid_entry(user_id: &UserId, key: &str) -> CacheEntry {
        // Snapshot season matches the current one so the seasonal rule
        // passes regardless of when the test runs.
        let season = Season::from_datetime(Utc::now());
        CacheEntry::new(
            user_id.clone(),
            key,
            json!({
                "seasonal_context": {"season": season.as_str(), "week_bucket": 0},
                "metrics": {
                    "complexity": 0.4,
                    "specificity": 0.2,
                    "stability": 0.6,
                    "hit_probability": 0.36
                }
            }),
            json!({"name": "Look A"}),
            Utc::now() - chrono::Duration::minutes(5),
        )
    }

    #[tokio::test]
    async fn missing_row_is_a_miss() {
        let mut store = MockCacheStorePort::new();
        store.expect_fetch().returning(|_, _| Ok(None));
        let service = ResponseCacheService::new(Arc::new(store));

        let result = service.lookup("abc", &user(), None).await;
        assert!(!result.cached);
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn store_failure_is_a_miss_not_an_error() {
        let mut store = MockCacheStorePort::new();
        store.expect_fetch().returning(|_, _| {
            Err(crate::ApplicationError::StoreUnavailable(
                "connection refused".to_string(),
            ))
        });
        let service = ResponseCacheService::new(Arc::new(store));

        let result = service.lookup("abc", &user(), None).await;
        assert!(!result.cached);
    }

    #[tokio::test]
    async fn validated_hit_returns_data_and_records_access() {
        let user_id = user();
        let entry = valid_entry(&user_id, "abc");

        let mut store = MockCacheStorePort::new();
        let fetched = entry.clone();
        store
            .expect_fetch()
            .returning(move |_, _| Ok(Some(fetched.clone())));
        store
            .expect_record_access()
            .times(1)
            .withf(move |uid, key, _| uid == &UserId::new("u1").unwrap() && key == "abc")
            .returning(|_, _, _| Ok(()));

        let service = ResponseCacheService::new(Arc::new(store));
        let result = service.lookup("abc", &user_id, None).await;

        assert!(result.cached);
        assert_eq!(result.data, Some(json!({"name": "Look A"})));
        let metrics = result.metrics.unwrap();
        assert!((metrics.stability - 0.6).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn hit_survives_access_bookkeeping_failure() {
        let user_id = user();
        let entry = valid_entry(&user_id, "abc");

        let mut store = MockCacheStorePort::new();
        let fetched = entry.clone();
        store
            .expect_fetch()
            .returning(move |_, _| Ok(Some(fetched.clone())));
        store.expect_record_access().returning(|_, _, _| {
            Err(crate::ApplicationError::StoreUnavailable(
                "write timeout".to_string(),
            ))
        });

        let service = ResponseCacheService::new(Arc::new(store));
        let result = service.lookup("abc", &user_id, None).await;
        assert!(result.cached);
    }

    #[tokio::test]
    async fn expired_entry_is_deleted_and_missed() {
        let user_id = user();
        let mut entry = valid_entry(&user_id, "abc");
        entry.created_at = Utc::now() - chrono::Duration::hours(25);

        let mut store = MockCacheStorePort::new();
        let fetched = entry.clone();
        store
            .expect_fetch()
            .returning(move |_, _| Ok(Some(fetched.clone())));
        store
            .expect_delete()
            .times(1)
            .withf(|uid, key| uid.as_str() == "u1" && key == "abc")
            .returning(|_, _| Ok(()));
        store.expect_record_access().never();

        let service = ResponseCacheService::new(Arc::new(store));
        let result = service.lookup("abc", &user_id, None).await;
        assert!(!result.cached);
    }

    #[tokio::test]
    async fn wardrobe_growth_invalidates_on_lookup() {
        let user_id = user();
        let entry = valid_entry(&user_id, "abc");
        let user_context = UserContext {
            wardrobe_evolution: Some(WardrobeEvolution {
                recent_additions: vec!["new-coat".to_string()],
                style_shifts: Vec::new(),
                last_analysis_date: Some(Utc::now()),
            }),
            ..UserContext::default()
        };

        let mut store = MockCacheStorePort::new();
        let fetched = entry.clone();
        store
            .expect_fetch()
            .returning(move |_, _| Ok(Some(fetched.clone())));
        store.expect_delete().times(1).returning(|_, _| Ok(()));

        let service = ResponseCacheService::new(Arc::new(store));
        let result = service.lookup("abc", &user_id, Some(&user_context)).await;
        assert!(!result.cached);
    }

    #[tokio::test]
    async fn store_response_inserts_a_snapshot() {
        let user_id = user();
        let items = wardrobe();
        let context = work_context();
        let req = request(&user_id, &items, &context, None);

        let mut store = MockCacheStorePort::new();
        store
            .expect_insert()
            .times(1)
            .withf(|entry: &CacheEntry| {
                let snapshot: RequestSnapshot =
                    serde_json::from_value(entry.request_data.clone()).unwrap();
                entry.access_count == 0
                    && snapshot.item_count == 2
                    && snapshot.prompt_type == PromptType::OutfitGeneration
                    && snapshot.seasonal_context.season == Season::from_datetime(Utc::now())
            })
            .returning(|_| Ok(()));

        let service = ResponseCacheService::new(Arc::new(store));
        let key = service.compose_key(&req);
        let stored = service
            .store_response(&key, &req, json!({"name": "Look A"}))
            .await;
        assert!(stored);
    }

    #[tokio::test]
    async fn duplicate_insert_reports_false() {
        let user_id = user();
        let items = wardrobe();
        let context = work_context();
        let req = request(&user_id, &items, &context, None);

        let mut store = MockCacheStorePort::new();
        store.expect_insert().returning(|entry| {
            Err(crate::ApplicationError::DuplicateEntry {
                user_id: entry.user_id.to_string(),
                request_hash: entry.request_hash.clone(),
            })
        });

        let service = ResponseCacheService::new(Arc::new(store));
        let key = service.compose_key(&req);
        let stored = service
            .store_response(&key, &req, json!({"name": "Look A"}))
            .await;
        assert!(!stored);
    }

    #[tokio::test]
    async fn evict_expired_passes_a_past_cutoff() {
        let mut store = MockCacheStorePort::new();
        store
            .expect_delete_older_than()
            .times(1)
            .withf(|cutoff, only_unused| *cutoff < Utc::now() && *only_unused)
            .returning(|_, _| Ok(7));

        let service = ResponseCacheService::new(Arc::new(store));
        let deleted = service
            .evict_expired(std::time::Duration::from_secs(3600), true)
            .await;
        assert_eq!(deleted, 7);
    }

    #[tokio::test]
    async fn eviction_failure_reports_zero() {
        let mut store = MockCacheStorePort::new();
        store.expect_delete_older_than().returning(|_, _| {
            Err(crate::ApplicationError::StoreUnavailable(
                "down".to_string(),
            ))
        });

        let service = ResponseCacheService::new(Arc::new(store));
        let deleted = service
            .evict_expired(std::time::Duration::from_secs(3600), false)
            .await;
        assert_eq!(deleted, 0);
    }
}
