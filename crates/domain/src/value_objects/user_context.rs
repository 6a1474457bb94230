//! User context - longer-lived signals about the requesting user
//!
//! Unlike `RequestContext`, which describes a single request, these values
//! describe the user across requests: style preferences, where they are in
//! the year, and how their wardrobe has been evolving. Wardrobe evolution
//! doubles as a staleness signal for cached responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Season;

/// Per-user signals accompanying a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// Long-lived style preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<StylePreferences>,

    /// Seasonal situation (season override, location)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_context: Option<SeasonalContext>,

    /// Recent wardrobe changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wardrobe_evolution: Option<WardrobeEvolution>,
}

/// Style preferences collected from profile and behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreferences {
    /// Preferred overall style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Preferred colors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    /// Lifestyle descriptor ("office", "outdoors", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<String>,

    /// Occasions the user dresses for regularly
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occasions: Vec<String>,

    /// Budget bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,

    /// Recent request activity, bucketed into cache keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_activity_count: Option<u32>,
}

/// Seasonal situation of the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalContext {
    /// Season override, e.g. for southern-hemisphere users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,

    /// Location the seasonal data applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Summary of recent wardrobe changes
///
/// A cache entry written before `last_analysis_date` is stale once new
/// items have arrived, since any generated outfit could have used them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WardrobeEvolution {
    /// Ids of items added since the last analysis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_additions: Vec<String>,

    /// Detected shifts in the user's style
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_shifts: Vec<String>,

    /// When the wardrobe was last analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analysis_date: Option<DateTime<Utc>>,
}

impl WardrobeEvolution {
    /// Whether the wardrobe materially changed after the given instant
    ///
    /// True only when items actually arrived: a fresh analysis date with no
    /// new items does not count as change.
    #[must_use]
    pub fn changed_since(&self, at: DateTime<Utc>) -> bool {
        !self.recent_additions.is_empty()
            && self.last_analysis_date.is_some_and(|analyzed| analyzed > at)
    }
}
