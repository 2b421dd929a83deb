//! Integration tests for cart consistency across execution contexts.
//!
//! These tests open several contexts on one storage area and check that
//! each sees the others' writes and receives `cart:updated` for them.

#![allow(clippy::unwrap_used)]

use gearup_core::{CategoryId, ProductId};
use gearup_integration_tests::TestStorefront;
use gearup_storefront::cart::{CART_UPDATED_EVENT, CartView, ChangeOrigin};
use gearup_storefront::catalog::CatalogSource;
use gearup_storefront::storage::keys;
use rust_decimal::Decimal;
use serde_json::json;

async fn add(tab: &gearup_storefront::state::AppState, id: &str) {
    let product = tab
        .catalog()
        .get_by_id(&CategoryId::new("tents"), &ProductId::new(id))
        .await
        .unwrap()
        .unwrap();
    tab.cart().add_item(&product);
}

// =============================================================================
// Cross-Context Tests
// =============================================================================

#[tokio::test]
async fn test_other_tab_sees_additions() {
    let store = TestStorefront::new();
    let first = store.tab();
    let second = store.tab();

    add(&first, "880RR").await;
    add(&first, "880RR").await;

    let state = second.cart().state();
    assert_eq!(state.len(), 1);
    assert_eq!(state.items()[0].quantity.get(), 2);
}

#[tokio::test]
async fn test_external_write_emits_cart_updated() {
    let store = TestStorefront::new();
    let first = store.tab();
    let second = store.tab();
    let mut first_events = first.cart().subscribe();
    let mut second_events = second.cart().subscribe();

    add(&first, "985RF").await;

    let local = first_events.try_recv().unwrap();
    assert_eq!(local.origin, ChangeOrigin::Local);
    assert_eq!(local.name(), CART_UPDATED_EVENT);

    let external = second_events.try_recv().unwrap();
    assert_eq!(external.origin, ChangeOrigin::External);

    // The writer is not told about its own write twice.
    assert!(first_events.try_recv().is_err());
}

#[tokio::test]
async fn test_writes_to_other_keys_are_not_cart_updates() {
    let store = TestStorefront::new();
    let first = store.tab();
    let second = store.tab();
    let mut events = second.cart().subscribe();

    first
        .cart()
        .kv()
        .set("gearup-theme", &json!("dark"))
        .unwrap();

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_quantity_changes_propagate() {
    let store = TestStorefront::new();
    let first = store.tab();
    let second = store.tab();

    add(&first, "880RR").await;
    add(&first, "344YJ").await;

    let tent = ProductId::new("880RR");
    second.cart().set_quantity(&tent, "4");
    first.cart().adjust_quantity(&tent, -1);

    let view = CartView::from(&second.cart().state());
    assert_eq!(view.item_count, 4);
    assert_eq!(view.items[0].quantity, 3);

    second.cart().adjust_quantity(&ProductId::new("344YJ"), -1);
    assert_eq!(first.cart().state().len(), 1);
}

#[tokio::test]
async fn test_cart_survives_reopen() {
    let store = TestStorefront::new();
    let first = store.tab();
    add(&first, "880RR").await;
    add(&first, "344YJ").await;
    drop(first);

    let reopened = store.reopen();
    let totals = reopened.cart().totals();
    assert_eq!(totals.item_count, 2);
    assert_eq!(totals.total, Decimal::new(26998, 2));
}

#[tokio::test]
async fn test_duplicate_rows_written_elsewhere_are_merged() {
    let store = TestStorefront::new();
    let writer = store.area().context();
    writer
        .set_raw(
            keys::CART,
            r#"[{"Id":"880RR","Price":199.99,"quantity":1,"Name":"Ajax"},
                {"Id":"880RR","Price":199.99,"quantity":2},
                {"Id":"985RF","Price":199.99}]"#,
        )
        .unwrap();

    let tab = store.tab();
    let view = CartView::from(&tab.cart().state());
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].name, "Ajax");
    assert_eq!(view.items[0].quantity, 3);
    assert_eq!(view.items[1].quantity, 1);
    assert_eq!(view.total, "$800");
}

#[tokio::test]
async fn test_corrupt_cart_reads_empty_and_recovers() {
    let store = TestStorefront::new();
    store
        .area()
        .context()
        .set_raw(keys::CART, "{not json")
        .unwrap();

    let tab = store.tab();
    assert!(tab.cart().state().is_empty());

    add(&tab, "880RR").await;
    assert_eq!(tab.cart().totals().item_count, 1);
}
