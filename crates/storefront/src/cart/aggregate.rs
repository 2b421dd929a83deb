//! Aggregation of stored entries into a normalized cart.

use std::collections::HashMap;

use gearup_core::{ProductId, Quantity};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use super::line_item::{LineItem, StoredEntry};

/// The aggregated cart: line items unique by id, in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Derived counts for this cart.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        compute_totals(self)
    }

    /// Back to the persisted representation.
    #[must_use]
    pub fn into_entries(self) -> Vec<StoredEntry> {
        self.items.into_iter().map(StoredEntry::from).collect()
    }

    pub(crate) fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub(crate) fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }
}

impl IntoIterator for CartState {
    type Item = LineItem;
    type IntoIter = std::vec::IntoIter<LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Item count and total price of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of `unit_price × quantity`.
    pub total: Decimal,
}

/// Merge stored entries by id.
///
/// Distinct ids keep the order in which they first appear and the price and
/// display fields of that first row. Quantities are summed, a missing
/// quantity counting as one. Lines whose summed quantity is below one are
/// dropped. Applying `aggregate` to its own output changes nothing.
pub fn aggregate(entries: impl IntoIterator<Item = StoredEntry>) -> CartState {
    let mut order: Vec<(StoredEntry, i64)> = Vec::new();
    let mut index: HashMap<ProductId, usize> = HashMap::new();

    for entry in entries {
        let quantity = entry.quantity_or_default();
        if let Some(&position) = index.get(&entry.id) {
            if let Some((_, total)) = order.get_mut(position) {
                *total = total.saturating_add(quantity);
            }
        } else {
            index.insert(entry.id.clone(), order.len());
            order.push((entry, quantity));
        }
    }

    let items = order
        .into_iter()
        .filter_map(|(entry, quantity)| {
            if quantity < 1 {
                debug!(product_id = %entry.id, quantity, "Dropping line below minimum quantity");
                return None;
            }
            Some(LineItem {
                id: entry.id,
                unit_price: entry.price,
                quantity: Quantity::sanitize_i64(quantity),
                display: entry.display,
            })
        })
        .collect();

    CartState { items }
}

/// Count items and sum prices over an aggregated cart.
///
/// Both sums saturate instead of overflowing.
#[must_use]
pub fn compute_totals(state: &CartState) -> CartTotals {
    state
        .items
        .iter()
        .fold(CartTotals::default(), |acc, item| CartTotals {
            item_count: acc.item_count.saturating_add(u64::from(item.quantity.get())),
            total: acc.total.saturating_add(item.subtotal()),
        })
}

/// Interpret the value stored under the cart key.
///
/// Absent data is an empty cart. Anything other than an array of
/// line-item-shaped objects is logged and also treated as an empty cart.
#[must_use]
pub fn parse_entries(stored: Option<Value>) -> Vec<StoredEntry> {
    match stored {
        None => Vec::new(),
        Some(value @ Value::Array(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Stored cart holds malformed entries; treating as empty");
            Vec::new()
        }),
        Some(other) => {
            warn!(kind = json_kind(&other), "Stored cart is not an array; treating as empty");
            Vec::new()
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entries(value: Value) -> Vec<StoredEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merges_duplicate_ids() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": 10, "quantity": 1},
            {"Id": "A", "Price": 10, "quantity": 2}
        ])));

        assert_eq!(state.len(), 1);
        let item = state.get(&ProductId::new("A")).unwrap();
        assert_eq!(item.quantity.get(), 3);
    }

    #[test]
    fn test_missing_quantity_counts_as_one() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": 10},
            {"Id": "A", "Price": 10},
            {"Id": "B", "Price": 4, "quantity": 2}
        ])));

        assert_eq!(state.items()[0].quantity.get(), 2);
        assert_eq!(state.items()[1].quantity.get(), 2);
    }

    #[test]
    fn test_preserves_first_seen_order_and_fields() {
        let state = aggregate(entries(json!([
            {"Id": "B", "Price": 5, "Name": "first B"},
            {"Id": "A", "Price": 10},
            {"Id": "B", "Price": 7, "Name": "second B"}
        ])));

        let ids: Vec<&str> = state.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
        assert_eq!(state.items()[0].name(), "first B");
        assert_eq!(state.items()[0].unit_price.amount(), Decimal::new(5, 0));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let once = aggregate(entries(json!([
            {"Id": "A", "Price": 10, "quantity": 1},
            {"Id": "B", "Price": 5},
            {"Id": "A", "Price": 10, "quantity": 4},
            {"Id": "C", "Price": 1, "quantity": 0},
            {"Id": "B", "Price": 5, "quantity": 2}
        ])));
        let twice = aggregate(once.clone().into_entries());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_drops_non_positive_totals() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": 10, "quantity": 0},
            {"Id": "B", "Price": 10, "quantity": -2},
            {"Id": "B", "Price": 10, "quantity": 1}
        ])));
        assert!(state.is_empty());
    }

    #[test]
    fn test_totals() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": 10, "quantity": 2},
            {"Id": "B", "Price": 5, "quantity": 3}
        ])));

        let totals = compute_totals(&state);
        assert_eq!(totals.item_count, 5);
        assert_eq!(totals.total, Decimal::new(35, 0));
    }

    #[test]
    fn test_totals_saturate_on_huge_prices() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": "10000000000000000000000000000", "quantity": 10},
            {"Id": "B", "Price": "50000000000000000000000000000", "quantity": 1},
            {"Id": "C", "Price": "50000000000000000000000000000", "quantity": 1}
        ])));

        let totals = compute_totals(&state);
        assert_eq!(totals.item_count, 12);
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_totals_keep_cents() {
        let state = aggregate(entries(json!([
            {"Id": "A", "Price": 0.1, "quantity": 3}
        ])));
        assert_eq!(state.totals().total, Decimal::new(3, 1));
    }

    #[test]
    fn test_empty_totals() {
        assert_eq!(CartState::empty().totals(), CartTotals::default());
    }

    #[test]
    fn test_parse_entries_tolerates_corruption() {
        assert!(parse_entries(None).is_empty());
        assert!(parse_entries(Some(json!({"Id": "A"}))).is_empty());
        assert!(parse_entries(Some(json!("so-cart"))).is_empty());
        assert!(parse_entries(Some(json!([1, 2, 3]))).is_empty());
        assert!(parse_entries(Some(json!([{"Id": "A", "Price": "cheap"}]))).is_empty());
    }

    #[test]
    fn test_parse_entries_reads_array() {
        let parsed = parse_entries(Some(json!([{"Id": "A", "Price": 3}])));
        assert_eq!(parsed.len(), 1);
    }
}
