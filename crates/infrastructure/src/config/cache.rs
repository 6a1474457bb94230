//! Cache configuration with age and warming settings.

use domain::CacheStrategy;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Cache behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether the response cache is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Hard age limit for entries in seconds (default: 24 hours)
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Key strategy used when the caller does not choose one
    #[serde(default)]
    pub default_strategy: CacheStrategy,

    /// Maximum number of entries in the L1 (in-memory) layer
    #[serde(default = "default_l1_max_entries")]
    pub l1_max_entries: u64,

    /// How often the eviction task runs, in seconds (default: 1 hour)
    #[serde(default = "default_eviction_interval")]
    pub eviction_interval_secs: u64,

    /// Whether eviction only removes entries that were never read
    #[serde(default)]
    pub evict_unused_only: bool,

    /// Sightings before a key becomes a warming candidate
    #[serde(default = "default_warm_min_hits")]
    pub warm_min_hits: u64,
}

const fn default_max_age() -> u64 {
    24 * 60 * 60
}

const fn default_l1_max_entries() -> u64 {
    10_000
}

const fn default_eviction_interval() -> u64 {
    60 * 60
}

const fn default_warm_min_hits() -> u64 {
    3
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: default_max_age(),
            default_strategy: CacheStrategy::default(),
            l1_max_entries: default_l1_max_entries(),
            eviction_interval_secs: default_eviction_interval(),
            evict_unused_only: false,
            warm_min_hits: default_warm_min_hits(),
        }
    }
}

impl CacheSettings {
    /// Get the age limit as a Duration
    #[must_use]
    pub const fn max_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.max_age_secs)
    }

    /// Get the eviction interval as a Duration
    #[must_use]
    pub const fn eviction_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.eviction_interval_secs)
    }
}
