//! Context fingerprinting - five deterministic signal groups
//!
//! Each group collects its signals into a sorted map of normalized strings
//! and hashes the joined result into a short digest. Absent signals are
//! omitted, so an empty group hashes to a stable constant rather than
//! erroring. Structurally-equal inputs must produce identical fingerprints
//! regardless of key insertion order or array ordering; the whole cache
//! rests on that property.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use domain::{
    RequestContext, Season, StylePreferences, UserContext, WardrobeEvolution,
    normalize::{normalize_list, normalize_str, normalize_value},
    week_bucket,
};
use serde::{Deserialize, Serialize};

const CORE_LEN: usize = 8;
const STYLE_LEN: usize = 6;
const TEMPORAL_LEN: usize = 4;
const BEHAVIORAL_LEN: usize = 6;
const ENVIRONMENTAL_LEN: usize = 4;

/// The five signal-group digests derived from a request
///
/// Ephemeral; never persisted as its own row but embedded in the request
/// snapshot for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFingerprint {
    /// Occasion, weather, formality, activity, purpose
    pub core: String,
    /// Requested and preferred style/colors/aesthetic
    pub style: String,
    /// Season and week bucket
    pub temporal: String,
    /// Lifestyle, occasions, budget, wardrobe-evolution signals
    pub behavioral: String,
    /// Location and climate
    pub environmental: String,
}

/// A fingerprint plus the signal statistics the key metrics need
#[derive(Debug, Clone)]
pub struct ExtractedFingerprint {
    /// The five digests
    pub fingerprint: ContextFingerprint,
    /// How many of the five groups had at least one signal
    pub populated_groups: usize,
    /// Whether the behavioral group had any signal
    pub behavioral_present: bool,
}

/// Truncated blake3 hex digest
pub(crate) fn short_digest(input: &str, len: usize) -> String {
    let mut hex = blake3::hash(input.as_bytes()).to_hex().to_string();
    hex.truncate(len);
    hex
}

/// Hash a signal group into a short digest
///
/// The map is a `BTreeMap`, so iteration is key-sorted and the digest is
/// independent of insertion order.
fn group_digest(signals: &BTreeMap<&'static str, String>, len: usize) -> String {
    let mut joined = String::new();
    for (key, value) in signals {
        joined.push_str(key);
        joined.push('=');
        joined.push_str(value);
        joined.push('|');
    }
    short_digest(&joined, len)
}

fn core_signals(context: &RequestContext) -> BTreeMap<&'static str, String> {
    let mut signals = BTreeMap::new();
    if let Some(occasion) = &context.occasion {
        signals.insert("occasion", normalize_str(occasion));
    }
    if let Some(weather) = &context.weather {
        signals.insert("weather", normalize_str(weather));
    }
    if let Some(formality) = &context.formality {
        signals.insert("formality", normalize_str(formality));
    }
    // Allow-listed keys that only ever arrive through the open map.
    for key in ["activity", "purpose"] {
        if let Some(value) = context.extra.get(key) {
            signals.insert(key, normalize_value(value));
        }
    }
    signals
}

fn style_signals(
    context: &RequestContext,
    preferences: Option<&StylePreferences>,
) -> BTreeMap<&'static str, String> {
    let mut signals = BTreeMap::new();
    if let Some(style) = &context.style {
        signals.insert("style", normalize_str(style));
    }
    if !context.colors.is_empty() {
        signals.insert("colors", normalize_list(&context.colors));
    }
    if let Some(aesthetic) = &context.aesthetic {
        signals.insert("aesthetic", normalize_str(aesthetic));
    }
    if let Some(prefs) = preferences {
        if let Some(style) = &prefs.style {
            signals.insert("pref_style", normalize_str(style));
        }
        if !prefs.colors.is_empty() {
            signals.insert("pref_colors", normalize_list(&prefs.colors));
        }
    }
    signals
}

fn temporal_signals(
    user_context: Option<&UserContext>,
    now: DateTime<Utc>,
) -> BTreeMap<&'static str, String> {
    let mut signals = BTreeMap::new();
    signals.insert("season", Season::from_datetime(now).as_str().to_string());
    signals.insert("week_bucket", week_bucket(now).to_string());
    if let Some(season) = user_context
        .and_then(|u| u.seasonal_context.as_ref())
        .and_then(|s| s.season)
    {
        signals.insert("user_season", season.as_str().to_string());
    }
    signals
}

fn behavioral_signals(
    preferences: Option<&StylePreferences>,
    evolution: Option<&WardrobeEvolution>,
) -> BTreeMap<&'static str, String> {
    let mut signals = BTreeMap::new();
    if let Some(prefs) = preferences {
        if let Some(lifestyle) = &prefs.lifestyle {
            signals.insert("lifestyle", normalize_str(lifestyle));
        }
        if !prefs.occasions.is_empty() {
            signals.insert("occasions", normalize_list(&prefs.occasions));
        }
        if let Some(budget) = &prefs.budget {
            signals.insert("budget", normalize_str(budget));
        }
    }
    if let Some(evolution) = evolution {
        if !evolution.style_shifts.is_empty() {
            signals.insert("style_shifts", normalize_list(&evolution.style_shifts));
        }
        signals.insert(
            "recent_additions",
            evolution.recent_additions.len().to_string(),
        );
    }
    signals
}

fn environmental_signals(
    context: &RequestContext,
    user_context: Option<&UserContext>,
) -> BTreeMap<&'static str, String> {
    let mut signals = BTreeMap::new();
    if let Some(location) = &context.location {
        signals.insert("location", normalize_str(location));
    }
    if let Some(climate) = &context.climate {
        signals.insert("climate", normalize_str(climate));
    }
    if let Some(location) = user_context
        .and_then(|u| u.seasonal_context.as_ref())
        .and_then(|s| s.location.as_ref())
    {
        signals.insert("user_location", normalize_str(location));
    }
    signals
}

/// Derive the five signal groups from a request's context
///
/// `now` is injected so temporal signals are reproducible; callers on the
/// request path pass `Utc::now()`.
#[must_use]
pub fn extract_fingerprint(
    context: &RequestContext,
    user_context: Option<&UserContext>,
    now: DateTime<Utc>,
) -> ExtractedFingerprint {
    let preferences = user_context.and_then(|u| u.preferences.as_ref());
    let evolution = user_context.and_then(|u| u.wardrobe_evolution.as_ref());

    let core = core_signals(context);
    let style = style_signals(context, preferences);
    let temporal = temporal_signals(user_context, now);
    let behavioral = behavioral_signals(preferences, evolution);
    let environmental = environmental_signals(context, user_context);

    let populated_groups = [&core, &style, &temporal, &behavioral, &environmental]
        .into_iter()
        .filter(|group| !group.is_empty())
        .count();
    let behavioral_present = !behavioral.is_empty();

    ExtractedFingerprint {
        fingerprint: ContextFingerprint {
            core: group_digest(&core, CORE_LEN),
            style: group_digest(&style, STYLE_LEN),
            temporal: group_digest(&temporal, TEMPORAL_LEN),
            behavioral: group_digest(&behavioral, BEHAVIORAL_LEN),
            environmental: group_digest(&environmental, ENVIRONMENTAL_LEN),
        },
        populated_groups,
        behavioral_present,
    }
}
