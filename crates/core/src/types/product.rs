//! Catalog product record.
//!
//! Mirrors one object in a category file such as `json/tents.json`. Field
//! names keep the catalog's PascalCase spelling because the same names are
//! persisted in the cart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Price, ProductId};

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    /// Any further catalog fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductRecord {
    /// Short text for listing cards: tagline, else description, else empty.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.tagline
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }

    /// Alt text for the product image, falling back to the product name.
    #[must_use]
    pub fn image_alt_or_name(&self) -> &str {
        self.image_alt.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tent() -> Value {
        json!({
            "Id": "880RR",
            "Name": "Marmot Ajax Tent - 3-Person, 3-Season",
            "Price": 199.99,
            "Image": "../images/tents/marmot-ajax-tent.jpg",
            "Tagline": "Roomy and light",
            "Features": ["Two doors", "Full-coverage fly"],
            "Brand": { "Name": "Marmot" }
        })
    }

    #[test]
    fn test_parses_catalog_object() {
        let product: ProductRecord = serde_json::from_value(tent()).unwrap();
        assert_eq!(product.id.as_str(), "880RR");
        assert_eq!(product.features.len(), 2);
        assert!(product.includes.is_empty());
        assert_eq!(product.extra.get("Brand"), Some(&json!({ "Name": "Marmot" })));
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let product: ProductRecord = serde_json::from_value(tent()).unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["Brand"]["Name"], "Marmot");
        assert_eq!(value["Price"], json!(199.99));
    }

    #[test]
    fn test_summary_and_alt_fallbacks() {
        let mut product: ProductRecord = serde_json::from_value(tent()).unwrap();
        assert_eq!(product.summary(), "Roomy and light");
        assert_eq!(product.image_alt_or_name(), product.name);

        product.tagline = None;
        product.description = Some("A tent".to_string());
        assert_eq!(product.summary(), "A tent");
    }
}
