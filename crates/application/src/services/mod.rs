//! Cache subsystem services

mod cache_key;
mod cached_generation;
mod fingerprint;
mod invalidation;
mod response_cache;
mod single_flight;
mod warming;

pub use cache_key::{
    CacheKeyMetrics, CacheRequest, ComposedCacheKey, compose_key, item_signature,
};
pub use cached_generation::{CachedGenerationService, GenerationOutcome};
pub use fingerprint::{ContextFingerprint, ExtractedFingerprint, extract_fingerprint};
pub use invalidation::{InvalidationPolicy, Verdict};
pub use response_cache::{CacheLookup, RequestSnapshot, ResponseCacheService, SeasonalSnapshot};
pub use single_flight::SingleFlight;
pub use warming::WarmingTracker;
