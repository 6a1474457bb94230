//! Prompt type - which AI task a cache entry belongs to

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The AI task a request targets
///
/// The prompt type is folded into every cache key so that, say, an outfit
/// generation and a wardrobe analysis over the same items never share an
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptType {
    /// Generate a complete outfit from wardrobe items
    OutfitGeneration,
    /// Classify a single clothing item
    ItemClassification,
    /// Analyze the wardrobe as a whole
    WardrobeAnalysis,
    /// Free-form styling advice
    StyleAdvice,
}

impl PromptType {
    /// Stable string form used inside cache keys and persisted rows
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutfitGeneration => "outfit-generation",
            Self::ItemClassification => "item-classification",
            Self::WardrobeAnalysis => "wardrobe-analysis",
            Self::StyleAdvice => "style-advice",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outfit-generation" => Ok(Self::OutfitGeneration),
            "item-classification" => Ok(Self::ItemClassification),
            "wardrobe-analysis" => Ok(Self::WardrobeAnalysis),
            "style-advice" => Ok(Self::StyleAdvice),
            other => Err(DomainError::UnknownPromptType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        for pt in [
            PromptType::OutfitGeneration,
            PromptType::ItemClassification,
            PromptType::WardrobeAnalysis,
            PromptType::StyleAdvice,
        ] {
            assert_eq!(pt.as_str().parse::<PromptType>().unwrap(), pt);
        }
    }

    #[test]
    fn unknown_string_is_rejected() {
        assert!("weather-report".parse::<PromptType>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&PromptType::OutfitGeneration).unwrap();
        assert_eq!(json, "\"outfit-generation\"");
    }
}
