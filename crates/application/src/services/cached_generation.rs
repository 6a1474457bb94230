//! Cached generation - the cache wrapped around the generator
//!
//! Request handlers go through this service instead of calling the
//! generator directly: it composes the key, collapses concurrent identical
//! requests, serves validated hits, and stores fresh responses best-effort.
//! Generator failures propagate (the handler owns the fallback); cache
//! failures never do.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{
    cache_key::CacheRequest, response_cache::ResponseCacheService, single_flight::SingleFlight,
    warming::WarmingTracker,
};
use crate::{
    error::ApplicationError,
    ports::{GenerationOptions, GenerationPort},
};

/// Outcome of a cached generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// The response payload, cached or fresh
    pub data: Value,
    /// Whether the payload came from the cache
    pub cached: bool,
    /// The cache key the request resolved to
    pub key: String,
}

/// Generation service with the context-aware cache in front
pub struct CachedGenerationService {
    cache: Arc<ResponseCacheService>,
    generator: Arc<dyn GenerationPort>,
    single_flight: SingleFlight,
    warming: WarmingTracker,
    enabled: bool,
}

impl fmt::Debug for CachedGenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedGenerationService")
            .field("enabled", &self.enabled)
            .field("tracked_keys", &self.warming.len())
            .finish_non_exhaustive()
    }
}

impl CachedGenerationService {
    /// Create a caching wrapper around a generator
    #[must_use]
    pub fn new(cache: Arc<ResponseCacheService>, generator: Arc<dyn GenerationPort>) -> Self {
        Self {
            cache,
            generator,
            single_flight: SingleFlight::new(),
            warming: WarmingTracker::new(),
            enabled: true,
        }
    }

    /// Disable the cache, passing every request straight to the generator
    #[must_use]
    pub const fn with_caching_disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Keys popular enough to be worth pre-generating
    #[must_use]
    pub fn warm_candidates(&self, min_hits: u64) -> Vec<String> {
        self.warming.candidates(min_hits)
    }

    /// Generate a response, serving from the cache when possible
    #[instrument(skip_all, fields(user = %request.user_id, prompt_type = %request.prompt_type, cached = tracing::field::Empty))]
    pub async fn generate(
        &self,
        request: &CacheRequest<'_>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutcome, ApplicationError> {
        if !self.enabled {
            let data = self.generator.generate(prompt, options).await?;
            return Ok(GenerationOutcome {
                data,
                cached: false,
                key: String::new(),
            });
        }

        let composed = self.cache.compose_key(request);
        self.warming.observe(&composed.key);

        let outcome = self
            .single_flight
            .run(&composed.key, || async {
                let lookup = self
                    .cache
                    .lookup(&composed.key, request.user_id, request.user_context)
                    .await;
                if let Some(data) = lookup.data.filter(|_| lookup.cached) {
                    info!("Serving cached AI response");
                    return Ok(GenerationOutcome {
                        data,
                        cached: true,
                        key: composed.key.clone(),
                    });
                }

                let data = self.generator.generate(prompt, options).await?;

                // Best-effort: a failed write just means the next request
                // generates again.
                let stored = self.cache.store_response(&composed, request, data.clone()).await;
                debug!(stored, "Fresh AI response generated");

                Ok(GenerationOutcome {
                    data,
                    cached: false,
                    key: composed.key.clone(),
                })
            })
            .await;

        if let Ok(outcome) = &outcome {
            tracing::Span::current().record("cached", outcome.cached);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use domain::{CacheStrategy, ClothingItem, PromptType, RequestContext, UserId};
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::ports::{CacheStorePort, MockGenerationPort};
    use domain::CacheEntry;

    /// In-memory store backing the end-to-end decorator tests
    #[derive(Debug, Default)]
    struct InMemoryStore {
        rows: Mutex<Vec<CacheEntry>>,
    }

    #[async_trait]
    impl CacheStorePort for InMemoryStore {
        async fn fetch(
            &self,
            user_id: &UserId,
            request_hash: &str,
        ) -> Result<Option<CacheEntry>, ApplicationError> {
            Ok(self
                .rows
                .lock()
                .iter()
                .find(|row| &row.user_id == user_id && row.request_hash == request_hash)
                .cloned())
        }

        async fn insert(&self, entry: &CacheEntry) -> Result<(), ApplicationError> {
            let mut rows = self.rows.lock();
            if rows
                .iter()
                .any(|row| row.user_id == entry.user_id && row.request_hash == entry.request_hash)
            {
                return Err(ApplicationError::DuplicateEntry {
                    user_id: entry.user_id.to_string(),
                    request_hash: entry.request_hash.clone(),
                });
            }
            rows.push(entry.clone());
            Ok(())
        }

        async fn record_access(
            &self,
            user_id: &UserId,
            request_hash: &str,
            accessed_at: chrono::DateTime<chrono::Utc>,
        ) -> Result<(), ApplicationError> {
            let mut rows = self.rows.lock();
            if let Some(row) = rows
                .iter_mut()
                .find(|row| &row.user_id == user_id && row.request_hash == request_hash)
            {
                row.record_access(accessed_at);
            }
            Ok(())
        }

        async fn delete(
            &self,
            user_id: &UserId,
            request_hash: &str,
        ) -> Result<(), ApplicationError> {
            self.rows
                .lock()
                .retain(|row| !(&row.user_id == user_id && row.request_hash == request_hash));
            Ok(())
        }

        async fn delete_older_than(
            &self,
            cutoff: chrono::DateTime<chrono::Utc>,
            only_unused: bool,
        ) -> Result<u64, ApplicationError> {
            let mut rows = self.rows.lock();
            let before = rows.len();
            rows.retain(|row| {
                row.created_at >= cutoff || (only_unused && row.access_count > 0)
            });
            Ok((before - rows.len()) as u64)
        }
    }

    fn service_with_generator(
        generator: MockGenerationPort,
    ) -> (CachedGenerationService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        let cache = Arc::new(ResponseCacheService::new(store.clone()));
        (
            CachedGenerationService::new(cache, Arc::new(generator)),
            store,
        )
    }

    fn outfit_request<'a>(
        user_id: &'a UserId,
        items: &'a [ClothingItem],
        context: &'a RequestContext,
    ) -> CacheRequest<'a> {
        CacheRequest {
            user_id,
            items,
            context,
            prompt_type: PromptType::OutfitGeneration,
            user_context: None,
            strategy: CacheStrategy::Balanced,
        }
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let mut generator = MockGenerationPort::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_, _| Ok(json!({"name": "Look A"})));

        let (service, _store) = service_with_generator(generator);
        let user_id = UserId::new("u1").unwrap();
        let items = vec![ClothingItem::new("a", "Tops")];
        let context = RequestContext::default();
        let request = outfit_request(&user_id, &items, &context);
        let options = GenerationOptions::default();

        let first = service.generate(&request, "prompt", &options).await.unwrap();
        assert!(!first.cached);

        let second = service.generate(&request, "prompt", &options).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.data, json!({"name": "Look A"}));
        assert_eq!(first.key, second.key);
    }

    #[tokio::test]
    async fn generator_failure_propagates_and_nothing_is_stored() {
        let mut generator = MockGenerationPort::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(ApplicationError::Generation("model overloaded".to_string())));

        let (service, store) = service_with_generator(generator);
        let user_id = UserId::new("u1").unwrap();
        let items = vec![ClothingItem::new("a", "Tops")];
        let context = RequestContext::default();
        let request = outfit_request(&user_id, &items, &context);

        let result = service
            .generate(&request, "prompt", &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(ApplicationError::Generation(_))));
        assert!(store.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn concurrent_identical_requests_generate_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut generator = MockGenerationPort::new();
        let counter = Arc::clone(&calls);
        generator.expect_generate().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"name": "Look A"}))
        });

        let (service, _store) = service_with_generator(generator);
        let service = Arc::new(service);
        let user_id = UserId::new("u1").unwrap();
        let items = vec![ClothingItem::new("a", "Tops")];
        let context = RequestContext::default();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = Arc::clone(&service);
            let user_id = user_id.clone();
            let items = items.clone();
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                let request = outfit_request(&user_id, &items, &context);
                service
                    .generate(&request, "prompt", &GenerationOptions::default())
                    .await
                    .unwrap()
            }));
        }

        let mut cached_count = 0;
        for handle in handles {
            if handle.await.unwrap().cached {
                cached_count += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached_count, 3);
    }

    #[tokio::test]
    async fn disabled_cache_always_generates() {
        let mut generator = MockGenerationPort::new();
        generator
            .expect_generate()
            .times(2)
            .returning(|_, _| Ok(json!({"name": "Look A"})));

        let (service, store) = service_with_generator(generator);
        let service = service.with_caching_disabled();
        let user_id = UserId::new("u1").unwrap();
        let items = vec![ClothingItem::new("a", "Tops")];
        let context = RequestContext::default();
        let request = outfit_request(&user_id, &items, &context);
        let options = GenerationOptions::default();

        service.generate(&request, "prompt", &options).await.unwrap();
        service.generate(&request, "prompt", &options).await.unwrap();
        assert!(store.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn popular_keys_become_warm_candidates() {
        let mut generator = MockGenerationPort::new();
        generator
            .expect_generate()
            .returning(|_, _| Ok(json!({"name": "Look A"})));

        let (service, _store) = service_with_generator(generator);
        let user_id = UserId::new("u1").unwrap();
        let items = vec![ClothingItem::new("a", "Tops")];
        let context = RequestContext::default();
        let request = outfit_request(&user_id, &items, &context);
        let options = GenerationOptions::default();

        for _ in 0..3 {
            service.generate(&request, "prompt", &options).await.unwrap();
        }

        assert_eq!(service.warm_candidates(3).len(), 1);
        assert!(service.warm_candidates(4).is_empty());
    }
}
