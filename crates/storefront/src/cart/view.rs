//! Cart display models.

use super::aggregate::CartState;
use super::line_item::LineItem;
use crate::format::format_currency;

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub image_alt: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: format_currency(rust_decimal::Decimal::ZERO),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Label for the cart button, e.g. `View cart (3)`.
    #[must_use]
    pub fn button_label(&self) -> String {
        if self.item_count > 0 {
            format!("View cart ({})", self.item_count)
        } else {
            "View cart".to_string()
        }
    }
}

impl From<&CartState> for CartView {
    fn from(state: &CartState) -> Self {
        let totals = state.totals();
        Self {
            items: state.items().iter().map(CartItemView::from).collect(),
            total: format_currency(totals.total),
            item_count: totals.item_count,
        }
    }
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        let name = item.name().to_owned();
        Self {
            id: item.id.to_string(),
            image: item.display.image.clone(),
            image_alt: item.display.image_alt.clone().unwrap_or_else(|| name.clone()),
            name,
            quantity: item.quantity.get(),
            price: format_currency(item.unit_price.amount()),
            line_price: format_currency(item.subtotal()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cart::aggregate;

    #[test]
    fn test_view_from_state() {
        let state = aggregate(
            serde_json::from_value::<Vec<_>>(json!([
                {"Id": "A", "Price": 10, "quantity": 2, "Name": "Tent", "Image": "a.jpg"},
                {"Id": "B", "Price": 1250, "quantity": 1, "Name": "Pack", "ImageAlt": "Blue pack"}
            ]))
            .unwrap(),
        );

        let view = CartView::from(&state);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "$1,270");
        assert_eq!(view.button_label(), "View cart (3)");

        let tent = &view.items[0];
        assert_eq!(tent.image_alt, "Tent");
        assert_eq!(tent.price, "$10");
        assert_eq!(tent.line_price, "$20");
        assert_eq!(view.items[1].image_alt, "Blue pack");
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.total, "$0");
        assert_eq!(view.button_label(), "View cart");
        assert_eq!(CartView::from(&CartState::empty()), view);
    }
}
