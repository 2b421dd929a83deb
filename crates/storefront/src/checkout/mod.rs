//! Mocked checkout.
//!
//! Nothing is charged or shipped. Submitting captures the aggregated cart and
//! the customer's details as an [`OrderRecord`], waits a short simulated
//! latency, stores the record under the last-order key and empties the cart.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gearup_core::{Email, EmailError, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::{CartStore, LineItem};
use crate::format::format_currency;
use crate::storage::{PersistentKv, StorageError, keys};

/// Latency of a simulated order submission.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1600);

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty. Add items before submitting.")]
    EmptyCart,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to store order: {0}")]
    Storage(#[from] StorageError),
}

/// Shipping and contact details from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerDetails {
    /// Check that every required field has content.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CheckoutError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// One-line shipping address, e.g. `1 Trail Rd, Bend, OR 97701`.
    #[must_use]
    pub fn shipping_line(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip)
    }
}

/// The stored confirmation of a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Absent on records written before references were assigned.
    #[serde(default)]
    pub reference: Option<Uuid>,
    pub customer: CustomerDetails,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub total_label: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl OrderRecord {
    /// Status to display; records without one show as in progress.
    #[must_use]
    pub fn status_or_default(&self) -> OrderStatus {
        self.status.unwrap_or(OrderStatus::InProgress)
    }

    /// Formatted total, derived from `total` when no label was stored.
    #[must_use]
    pub fn display_total(&self) -> String {
        self.total_label
            .clone()
            .unwrap_or_else(|| format_currency(self.total))
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

/// Submits the cart as a mocked order.
#[derive(Debug, Clone)]
pub struct Checkout {
    cart: Arc<CartStore>,
    delay: Duration,
}

impl Checkout {
    #[must_use]
    pub const fn new(cart: Arc<CartStore>, delay: Duration) -> Self {
        Self { cart, delay }
    }

    /// Submit the current cart for `customer`.
    ///
    /// On success the order is stored under the last-order key and the cart
    /// is cleared, which publishes `cart:updated`. If the cart cannot be
    /// cleared after the order is stored, the order still succeeds and the
    /// leftover cart is logged at `warn` with the order reference.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no lines, a
    /// validation error for incomplete details, or a storage error if the
    /// order cannot be written. The cart is untouched on every error.
    #[instrument(skip_all, fields(email = %customer.email))]
    pub async fn submit(&self, customer: CustomerDetails) -> Result<OrderRecord, CheckoutError> {
        customer.validate()?;

        let state = self.cart.state();
        if state.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = state.totals().total;
        let order = OrderRecord {
            reference: Some(Uuid::new_v4()),
            customer,
            items: state.into_iter().collect(),
            total,
            total_label: Some(format_currency(total)),
            submitted_at: Utc::now(),
            status: Some(OrderStatus::PreparingShipment),
        };

        tokio::time::sleep(self.delay).await;

        let value = serde_json::to_value(&order)?;
        self.cart.kv().set(keys::LAST_ORDER, &value)?;
        if !self.cart.try_clear() {
            warn!(
                reference = ?order.reference,
                "Order stored but the cart could not be cleared"
            );
        }

        info!(
            reference = ?order.reference,
            total = %order.display_total(),
            lines = order.items.len(),
            "Order submitted"
        );

        Ok(order)
    }
}

/// The most recently submitted order, if one is stored and readable.
#[must_use]
pub fn last_order(kv: &dyn PersistentKv) -> Option<OrderRecord> {
    let value = match kv.get(keys::LAST_ORDER) {
        Ok(value) => value?,
        Err(e) => {
            warn!(error = %e, "Failed to read last order");
            return None;
        }
    };

    serde_json::from_value(value)
        .inspect_err(|e| warn!(error = %e, "Stored order is malformed"))
        .ok()
}
