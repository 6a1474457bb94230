//! Cache key strategy presets
//!
//! A strategy is a named bundle of granularity and sensitivity settings.
//! It is the single biggest lever on hit rate versus specificity and must
//! always be chosen explicitly by the caller, never inferred.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// How much item detail is folded into the item-set signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemGranularity {
    /// Item id and category only
    Coarse,
    /// Id, category, color, and up to three style tags
    Medium,
    /// Id, category, color, brand, and all style tags
    Fine,
}

impl ItemGranularity {
    /// Expected hit-rate factor for this granularity, used in diagnostics
    #[must_use]
    pub const fn hit_rate_factor(self) -> f64 {
        match self {
            Self::Coarse => 0.8,
            Self::Medium => 0.6,
            Self::Fine => 0.4,
        }
    }
}

/// Named optimization strategy for cache key composition
///
/// Coarse keys collide more (two outfits differing only in color or brand
/// share a key) and hit more; fine keys are specific and miss more. The
/// collision behavior of `Performance` is the intended trade-off, not a
/// defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Maximize hit rate: coarse items, no seasonal or time signals
    Performance,
    /// Medium items with seasonal sensitivity
    #[default]
    Balanced,
    /// Maximize specificity: fine items, seasonal and hourly time signals
    Precision,
}

impl CacheStrategy {
    /// Item granularity for this strategy
    #[must_use]
    pub const fn granularity(self) -> ItemGranularity {
        match self {
            Self::Performance => ItemGranularity::Coarse,
            Self::Balanced => ItemGranularity::Medium,
            Self::Precision => ItemGranularity::Fine,
        }
    }

    /// Whether the temporal fingerprint participates in the key
    #[must_use]
    pub const fn seasonal_sensitivity(self) -> bool {
        !matches!(self, Self::Performance)
    }

    /// Whether an hour-resolution timestamp bucket participates in the key
    #[must_use]
    pub const fn include_timestamp(self) -> bool {
        matches!(self, Self::Precision)
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Balanced => "balanced",
            Self::Precision => "precision",
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performance" => Ok(Self::Performance),
            "balanced" => Ok(Self::Balanced),
            "precision" => Ok(Self::Precision),
            other => Err(DomainError::UnknownStrategy(other.to_string())),
        }
    }
}
