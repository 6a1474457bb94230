//! Invalidation policy - when a stored entry may still be served
//!
//! Three independent change signals each force regeneration: age past the
//! hard limit, wardrobe growth after the entry was written, and a season
//! change since write time. The rules run in that order and the first
//! failing one wins. Deliberately conservative; a stale personalized
//! response costs more than a regeneration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::{CacheEntry, Season, UserContext};

/// Why an entry was (or was not) invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The entry may be served
    Valid,
    /// Older than the hard age limit
    ExpiredByAge,
    /// The wardrobe gained items after this entry was generated
    WardrobeChanged,
    /// The stored season no longer matches the current one
    SeasonChanged,
}

impl Verdict {
    /// Whether the entry survives the policy
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// The invalidation rules with their configured age limit
#[derive(Debug, Clone, Copy)]
pub struct InvalidationPolicy {
    max_age: Duration,
}

impl InvalidationPolicy {
    /// Hard age limit applied when none is configured
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a policy with a custom age limit
    #[must_use]
    pub const fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// The configured age limit
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Evaluate an entry against the rules, in order
    #[must_use]
    pub fn evaluate(
        &self,
        entry: &CacheEntry,
        user_context: Option<&UserContext>,
        now: DateTime<Utc>,
    ) -> Verdict {
        if self.is_past_max_age(entry, now) {
            return Verdict::ExpiredByAge;
        }

        let evolution = user_context.and_then(|u| u.wardrobe_evolution.as_ref());
        if evolution.is_some_and(|e| e.changed_since(entry.created_at)) {
            return Verdict::WardrobeChanged;
        }

        if let Some(stored) = entry.stored_season() {
            let current = Season::from_datetime(now);
            if stored != current.as_str() {
                return Verdict::SeasonChanged;
            }
        }

        Verdict::Valid
    }

    fn is_past_max_age(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry
            .age(now)
            .to_std()
            // Negative age means a clock went backwards; not stale.
            .is_ok_and(|age| age > self.max_age)
    }
}

impl Default for InvalidationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_AGE)
    }
}
