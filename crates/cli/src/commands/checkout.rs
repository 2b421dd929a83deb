//! Checkout and order confirmation commands.

use clap::Args;
use gearup_core::Email;
use gearup_storefront::checkout::{CheckoutError, CustomerDetails, OrderRecord, last_order};
use gearup_storefront::error::{Result, add_breadcrumb};
use gearup_storefront::format::format_currency;
use gearup_storefront::state::AppState;

/// Checkout form fields.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zip: String,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,
}

impl CheckoutArgs {
    fn into_customer(self) -> std::result::Result<CustomerDetails, CheckoutError> {
        Ok(CustomerDetails {
            full_name: self.name,
            email: Email::parse(&self.email)?,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            notes: self.notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}

#[allow(clippy::print_stdout)]
pub async fn submit(state: &AppState, args: CheckoutArgs) -> Result<()> {
    let customer = args.into_customer()?;

    add_breadcrumb("checkout", "Submitted order", None);
    println!("Sending your order…");
    let order = state.checkout().submit(customer).await?;

    println!("Order received!");
    println!();
    print_order(&order);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn order(state: &AppState) {
    match last_order(state.cart().kv().as_ref()) {
        Some(order) => print_order(&order),
        None => println!("No recent order found."),
    }
}

#[allow(clippy::print_stdout)]
fn print_order(order: &OrderRecord) {
    if let Some(reference) = order.reference {
        println!("Order {reference}");
    }
    println!(
        "{}  {}  {}",
        order.submitted_at.format("%b %-d, %Y, %-I:%M %p UTC"),
        order.display_total(),
        order.status_or_default()
    );
    println!();
    println!("Shipping to");
    println!("  {}", order.customer.full_name);
    println!("  {}", order.customer.shipping_line());
    if let Some(notes) = &order.customer.notes {
        println!("  Notes: {notes}");
    }
    println!();
    println!("Items");
    if order.items.is_empty() {
        println!("  No items found.");
    }
    for item in &order.items {
        println!(
            "  {:<32} x {:>3}  {}",
            item.name(),
            item.quantity,
            format_currency(item.subtotal())
        );
    }
}
