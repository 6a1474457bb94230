//! Cache key composition
//!
//! Folds the context fingerprint, an item-set signature, and a behavior
//! signature into one bounded-length key, plus diagnostic metrics. The key
//! is a 32-hex-character truncated digest; truncation keeps the storage
//! index compact, and the residual collision risk is accepted at expected
//! table sizes.

use chrono::{DateTime, Utc};
use domain::{
    CacheStrategy, ClothingItem, ItemGranularity, PromptType, RequestContext, UserContext, UserId,
    normalize::normalize_str,
};
use serde::{Deserialize, Serialize};

use super::fingerprint::{
    ContextFingerprint, ExtractedFingerprint, extract_fingerprint, short_digest,
};

const KEY_LEN: usize = 32;
const ITEM_SIGNATURE_LEN: usize = 12;
const USER_PREFIX_LEN: usize = 8;
const STYLE_DIGEST_LEN: usize = 4;
const MEDIUM_TAG_LIMIT: usize = 3;
const ACTIVITY_BUCKET_CAP: u32 = 10;

/// Diagnostic metrics for a composed key
///
/// Tuning and observability only; no correctness decision may read these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheKeyMetrics {
    /// Fraction of the five fingerprint groups that carried signals
    pub complexity: f64,
    /// How much detail the request carried, saturating at 1.0
    pub specificity: f64,
    /// How long the key is expected to stay valid
    pub stability: f64,
    /// Rough hit-rate expectation for the chosen granularity
    pub hit_probability: f64,
}

/// A composed cache key with its diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedCacheKey {
    /// 32 hex characters; unique per user at realistic table sizes
    pub key: String,
    /// Diagnostic metrics
    pub metrics: CacheKeyMetrics,
    /// The five signal-group digests behind the key
    pub fingerprint: ContextFingerprint,
}

/// Everything a cache key is derived from
#[derive(Debug, Clone, Copy)]
pub struct CacheRequest<'a> {
    /// Owner of the entry
    pub user_id: &'a UserId,
    /// Wardrobe items the request operates on
    pub items: &'a [ClothingItem],
    /// Free-form request context
    pub context: &'a RequestContext,
    /// The AI task
    pub prompt_type: PromptType,
    /// Longer-lived user signals
    pub user_context: Option<&'a UserContext>,
    /// Hit-rate/specificity trade-off
    pub strategy: CacheStrategy,
}

/// Signature of the item set at the given granularity
///
/// Items are sorted by id first, so request-side ordering never changes the
/// signature. Coarse deliberately discards color and brand; that collision
/// behavior is the performance strategy's contract.
#[must_use]
pub fn item_signature(items: &[ClothingItem], granularity: ItemGranularity) -> String {
    let mut sorted: Vec<&ClothingItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let descriptors: Vec<String> = sorted
        .iter()
        .map(|item| item_descriptor(item, granularity))
        .collect();
    short_digest(&descriptors.join(";"), ITEM_SIGNATURE_LEN)
}

fn item_descriptor(item: &ClothingItem, granularity: ItemGranularity) -> String {
    let id = item.id.trim();
    let category = normalize_str(&item.category);
    match granularity {
        ItemGranularity::Coarse => format!("{id}|{category}"),
        ItemGranularity::Medium => {
            let color = item.color.as_deref().map(normalize_str).unwrap_or_default();
            let tags = sorted_tags(&item.style_tags, Some(MEDIUM_TAG_LIMIT));
            format!("{id}|{category}|{color}|{tags}")
        },
        ItemGranularity::Fine => {
            let color = item.color.as_deref().map(normalize_str).unwrap_or_default();
            let brand = item.brand.as_deref().map(normalize_str).unwrap_or_default();
            let tags = sorted_tags(&item.style_tags, None);
            format!("{id}|{category}|{color}|{brand}|{tags}")
        },
    }
}

fn sorted_tags(tags: &[String], limit: Option<usize>) -> String {
    let mut normalized: Vec<String> = tags.iter().map(|tag| normalize_str(tag)).collect();
    normalized.sort();
    if let Some(limit) = limit {
        normalized.truncate(limit);
    }
    normalized.join(",")
}

/// Human-legible behavior signature
///
/// Kept un-hashed on purpose so a key's user segment can be read off during
/// debugging: user-id prefix, capped activity bucket, short style digest.
fn behavior_signature(user_id: &UserId, user_context: Option<&UserContext>) -> String {
    let preferences = user_context.and_then(|u| u.preferences.as_ref());
    let activity = preferences
        .and_then(|p| p.recent_activity_count)
        .unwrap_or(0)
        .min(ACTIVITY_BUCKET_CAP);
    let style = preferences
        .and_then(|p| p.style.as_deref())
        .map(normalize_str)
        .unwrap_or_default();
    format!(
        "{}:a{}:{}",
        user_id.prefix(USER_PREFIX_LEN),
        activity,
        short_digest(&style, STYLE_DIGEST_LEN)
    )
}

/// Compose the cache key for a request at the given instant
#[must_use]
pub fn compose_key(request: &CacheRequest<'_>, now: DateTime<Utc>) -> ComposedCacheKey {
    let extracted = extract_fingerprint(request.context, request.user_context, now);
    let fingerprint = extracted.fingerprint.clone();
    let strategy = request.strategy;

    let items = item_signature(request.items, strategy.granularity());
    let behavior = behavior_signature(request.user_id, request.user_context);

    let mut parts = vec![
        request.user_id.prefix(USER_PREFIX_LEN),
        request.prompt_type.as_str().to_string(),
        items,
        fingerprint.core.clone(),
        fingerprint.style.clone(),
        behavior,
    ];
    if strategy.seasonal_sensitivity() {
        parts.push(fingerprint.temporal.clone());
    }
    if strategy.include_timestamp() {
        // Hour bucket: precision keys roll over hourly.
        parts.push(format!("h{}", now.timestamp() / 3600));
    }

    let key = short_digest(&parts.join("|"), KEY_LEN);
    let metrics = compute_metrics(request, &extracted);

    ComposedCacheKey {
        key,
        metrics,
        fingerprint,
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_metrics(request: &CacheRequest<'_>, extracted: &ExtractedFingerprint) -> CacheKeyMetrics {
    let strategy = request.strategy;
    let temporal_included = strategy.seasonal_sensitivity() || strategy.include_timestamp();

    let complexity = extracted.populated_groups as f64 / 5.0;
    let specificity =
        ((request.context.signal_count() + request.items.len()) as f64 / 20.0).min(1.0);
    let stability = if temporal_included {
        0.6
    } else if extracted.behavioral_present {
        0.8
    } else {
        0.9
    };
    let hit_probability = stability * strategy.granularity().hit_rate_factor();

    CacheKeyMetrics {
        complexity,
        specificity,
        stability,
        hit_probability,
    }
}
