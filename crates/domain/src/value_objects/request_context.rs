//! Request context - the free-form situation a request describes
//!
//! Contexts come from user input and upstream AI output, so the shape is a
//! set of well-known optional fields plus an open map for everything else.
//! The cache never validates this object; it only normalizes and hashes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form request context
///
/// All fields are optional; an entirely empty context is valid and hashes
/// to a stable constant. The `extra` map keeps keys sorted so serialization
/// and iteration are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// What the outfit is for ("work", "wedding", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,

    /// Weather description ("rainy", "hot", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,

    /// Formality level ("casual", "black tie", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formality: Option<String>,

    /// Requested style direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Requested color palette
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    /// Requested aesthetic ("minimalist", "cottagecore", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aesthetic: Option<String>,

    /// Where the outfit will be worn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Climate descriptor, distinct from day-to-day weather
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,

    /// Any other keys the caller sent, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RequestContext {
    /// Number of populated signals, known fields plus extra keys
    ///
    /// Feeds the specificity metric; not used for any correctness decision.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        let known = [
            self.occasion.is_some(),
            self.weather.is_some(),
            self.formality.is_some(),
            self.style.is_some(),
            !self.colors.is_empty(),
            self.aesthetic.is_some(),
            self.location.is_some(),
            self.climate.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count();
        known + self.extra.len()
    }

    /// True when no field and no extra key is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signal_count() == 0
    }
}
