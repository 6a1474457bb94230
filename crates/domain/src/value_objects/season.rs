//! Season bucketing used by temporal fingerprints and invalidation
//!
//! The bucketing is deliberately non-astronomical: zero-based month < 3 is
//! winter, < 6 spring, < 9 summer, else fall. Cached rows written under the
//! old rule would silently stop matching if this ever changed, so the rule
//! is frozen here and tested.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Calendar season as the cache sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Bucket a zero-based month (0 = January) into a season
    #[must_use]
    pub const fn from_month0(month0: u32) -> Self {
        if month0 < 3 {
            Self::Winter
        } else if month0 < 6 {
            Self::Spring
        } else if month0 < 9 {
            Self::Summer
        } else {
            Self::Fall
        }
    }

    /// Season of the given instant
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::from_month0(at.month0())
    }

    /// Stable lowercase name, used in fingerprints and persisted snapshots
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" => Ok(Self::Fall),
            other => Err(DomainError::UnknownSeason(other.to_string())),
        }
    }
}

/// Week-of-year collapsed into 4-week buckets
///
/// Gives temporal fingerprints sub-season resolution without rolling keys
/// over every day.
#[must_use]
pub fn week_bucket(at: DateTime<Utc>) -> u32 {
    at.iso_week().week() / 4
}
