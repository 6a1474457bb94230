//! Clothing item entity

use serde::{Deserialize, Serialize};

/// A single wardrobe item as the cache sees it
///
/// Only the fields that participate in item-set signatures are modeled;
/// the full item record (images, notes, timestamps) lives with the CRUD
/// layer and never reaches the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingItem {
    /// Stable item identifier
    pub id: String,
    /// Category ("Tops", "Bottoms", ...)
    pub category: String,
    /// Dominant color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Brand name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Style tags attached by classification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_tags: Vec<String>,
}

impl ClothingItem {
    /// Create an item with the two always-present fields
    #[must_use]
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Set the color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the style tags
    #[must_use]
    pub fn with_style_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.style_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let item = ClothingItem::new("a1", "Tops")
            .with_color("Black")
            .with_brand("Acme")
            .with_style_tags(["casual", "streetwear"]);

        assert_eq!(item.id, "a1");
        assert_eq!(item.category, "Tops");
        assert_eq!(item.color.as_deref(), Some("Black"));
        assert_eq!(item.brand.as_deref(), Some("Acme"));
        assert_eq!(item.style_tags, vec!["casual", "streetwear"]);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let item = ClothingItem::new("a1", "Tops");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("color"));
        assert!(!json.contains("brand"));
        assert!(!json.contains("style_tags"));
    }
}
