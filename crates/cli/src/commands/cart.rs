//! Cart commands.
//!
//! Each command goes through the context's `CartStore` and then prints the
//! resulting cart.

use gearup_core::ProductId;
use gearup_storefront::cart::CartView;
use gearup_storefront::error::{Result, add_breadcrumb};
use gearup_storefront::state::AppState;

use super::catalog::find_product;

#[allow(clippy::print_stdout)]
pub fn show(state: &AppState) {
    let view = CartView::from(&state.cart().state());

    if view.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &view.items {
        println!(
            "  {:<8} {:<32} {} x {:>3} = {}",
            item.id, item.name, item.price, item.quantity, item.line_price
        );
    }
    println!("Items: {}", view.item_count);
    println!("Total: {}", view.total);
}

pub async fn add(state: &AppState, id: &str, category: Option<&str>) -> Result<()> {
    let product = find_product(state, id, category).await?;
    state.cart().add_item(&product);
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id)]));
    show(state);
    Ok(())
}

pub fn remove(state: &AppState, id: &str) {
    state.cart().remove_item(&ProductId::from(id));
    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id)]));
    show(state);
}

pub fn set(state: &AppState, id: &str, quantity: &str) {
    state.cart().set_quantity(&ProductId::from(id), quantity);
    show(state);
}

pub fn adjust(state: &AppState, id: &str, delta: i64) {
    state.cart().adjust_quantity(&ProductId::from(id), delta);
    show(state);
}

pub fn clear(state: &AppState) {
    state.cart().clear();
    add_breadcrumb("cart", "Cleared cart", None);
    show(state);
}
