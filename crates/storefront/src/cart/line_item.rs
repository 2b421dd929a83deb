//! Persisted cart records.
//!
//! The cart key holds a JSON array of objects such as
//!
//! ```json
//! { "Id": "880RR", "Price": 199.99, "quantity": 2,
//!   "Name": "Marmot Ajax Tent", "Image": "...", "ImageAlt": "...", "Tagline": "..." }
//! ```
//!
//! Two shapes are modelled. [`StoredEntry`] is whatever sits in storage and
//! may repeat an id or omit `quantity`. [`LineItem`] is an aggregated entry
//! with a guaranteed quantity of at least one.

use gearup_core::{Price, ProductId, ProductRecord, Quantity};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Display attributes copied from the catalog and carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    /// Remaining catalog fields (`Tagline`, `Features`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DisplayFields {
    /// Copy the display attributes of a catalog record.
    ///
    /// Everything except `Id` and `Price` is kept, so the stored entry looks
    /// like the catalog object it came from.
    #[must_use]
    pub fn from_product(product: &ProductRecord) -> Self {
        let mut extra = product.extra.clone();
        if let Some(tagline) = &product.tagline {
            extra.insert("Tagline".to_owned(), Value::String(tagline.clone()));
        }
        if let Some(description) = &product.description {
            extra.insert("Description".to_owned(), Value::String(description.clone()));
        }
        if !product.features.is_empty() {
            extra.insert("Features".to_owned(), Value::from(product.features.clone()));
        }
        if !product.includes.is_empty() {
            extra.insert("Includes".to_owned(), Value::from(product.includes.clone()));
        }

        Self {
            name: Some(product.name.clone()),
            image: product.image.clone(),
            image_alt: product.image_alt.clone(),
            extra,
        }
    }
}

/// One raw record under the cart key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    #[serde(rename = "Id")]
    pub id: ProductId,
    #[serde(rename = "Price")]
    pub price: Price,
    /// Missing on rows appended by older pages; counts as one.
    #[serde(
        default,
        deserialize_with = "lenient_quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<i64>,
    #[serde(flatten)]
    pub display: DisplayFields,
}

impl StoredEntry {
    /// A fresh row for `product` with quantity one.
    #[must_use]
    pub fn from_product(product: &ProductRecord) -> Self {
        Self {
            id: product.id.clone(),
            price: product.price,
            quantity: Some(1),
            display: DisplayFields::from_product(product),
        }
    }

    /// Stored quantity, defaulting to one when absent.
    #[must_use]
    pub fn quantity_or_default(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

/// Accept any JSON number, flooring fractions; `null` reads as absent.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(raw.map(|number| {
        number.as_i64().unwrap_or_else(|| {
            // Saturating cast; NaN cannot appear in parsed JSON.
            #[allow(clippy::cast_possible_truncation)]
            let floored = number.as_f64().unwrap_or(0.0).floor() as i64;
            floored
        })
    }))
}

/// An aggregated cart line: unique id, quantity of at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "Id")]
    pub id: ProductId,
    /// Price snapshot taken when the product was added.
    #[serde(rename = "Price")]
    pub unit_price: Price,
    pub quantity: Quantity,
    #[serde(flatten)]
    pub display: DisplayFields,
}

impl LineItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> rust_decimal::Decimal {
        self.unit_price.line_total(self.quantity)
    }

    /// Product name, or the id when the entry carries none.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display.name.as_deref().unwrap_or(self.id.as_str())
    }
}

impl From<LineItem> for StoredEntry {
    fn from(item: LineItem) -> Self {
        Self {
            id: item.id,
            price: item.unit_price,
            quantity: Some(i64::from(item.quantity.get())),
            display: item.display,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stored_entry_keeps_pass_through_fields() {
        let raw = json!({
            "Id": "880RR",
            "Price": 199.99,
            "Name": "Marmot Ajax Tent",
            "ImageAlt": "Green tent",
            "Tagline": "Roomy",
            "Colors": ["Pale Pumpkin"]
        });

        let entry: StoredEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.quantity, None);
        assert_eq!(entry.quantity_or_default(), 1);
        assert_eq!(entry.display.name.as_deref(), Some("Marmot Ajax Tent"));
        assert_eq!(entry.display.extra.get("Tagline"), Some(&json!("Roomy")));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["Colors"], json!(["Pale Pumpkin"]));
        assert!(back.get("quantity").is_none());
    }

    #[test]
    fn test_fractional_quantity_is_floored() {
        let entry: StoredEntry =
            serde_json::from_value(json!({"Id": "A", "Price": 1, "quantity": 2.9})).unwrap();
        assert_eq!(entry.quantity, Some(2));
    }

    #[test]
    fn test_entry_without_id_is_rejected() {
        assert!(serde_json::from_value::<StoredEntry>(json!({"Price": 1})).is_err());
    }

    #[test]
    fn test_from_product_copies_catalog_fields() {
        let product: ProductRecord = serde_json::from_value(json!({
            "Id": "985RF",
            "Name": "The North Face Talus Tent",
            "Price": 199.99,
            "Image": "talus.jpg",
            "Description": "Two-person tent",
            "Includes": ["Stakes"]
        }))
        .unwrap();

        let entry = StoredEntry::from_product(&product);
        assert_eq!(entry.quantity, Some(1));
        assert_eq!(entry.price, product.price);
        assert_eq!(entry.display.image.as_deref(), Some("talus.jpg"));
        assert_eq!(entry.display.extra["Description"], json!("Two-person tent"));
        assert_eq!(entry.display.extra["Includes"], json!(["Stakes"]));
    }
}
