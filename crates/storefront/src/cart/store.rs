//! The cart store: sole reader and writer of the persisted cart.

use std::sync::Arc;

use gearup_core::{IntoQuantity, ProductId, ProductRecord, Quantity};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use super::aggregate::{CartState, CartTotals, aggregate, parse_entries};
use super::events::{CartEvents, CartUpdated, ChangeOrigin};
use super::line_item::{LineItem, StoredEntry};
use crate::storage::{PersistentKv, Subscription, keys};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Canonical owner of the cart.
///
/// Every mutation runs a full cycle: read the stored entries, aggregate,
/// transform, drop lines below the minimum quantity, persist, then publish
/// `cart:updated`. No operation returns an error. Unreadable stored data
/// reads as an empty cart and failed writes are logged.
///
/// Two stores on different contexts of the same storage area each see the
/// other's writes as external `cart:updated` events. There is no locking
/// between them: if both read before either writes, the later write wins
/// and the earlier update is lost.
pub struct CartStore {
    kv: Arc<dyn PersistentKv>,
    events: CartEvents,
    _external: Subscription,
}

impl CartStore {
    /// Create a store over `kv` and start relaying external cart changes.
    pub fn new(kv: Arc<dyn PersistentKv>) -> Self {
        let events = CartEvents::new(EVENT_CAPACITY);
        let relay = events.clone();
        let external = kv.on_external_change(
            keys::CART,
            Arc::new(move |key: &str| {
                debug!(key, "Cart changed in another context");
                relay.publish(ChangeOrigin::External);
            }),
        );

        Self {
            kv,
            events,
            _external: external,
        }
    }

    /// Subscribe to `cart:updated` events.
    pub fn subscribe(&self) -> broadcast::Receiver<CartUpdated> {
        self.events.subscribe()
    }

    /// The storage this store persists to.
    #[must_use]
    pub fn kv(&self) -> &Arc<dyn PersistentKv> {
        &self.kv
    }

    /// Raw stored entries, possibly with repeated ids.
    #[must_use]
    pub fn items(&self) -> Vec<StoredEntry> {
        let stored = self.kv.get(keys::CART).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored cart; treating as empty");
            None
        });
        parse_entries(stored)
    }

    /// The aggregated cart.
    #[must_use]
    pub fn state(&self) -> CartState {
        aggregate(self.items())
    }

    /// Item count and total of the aggregated cart.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.state().totals()
    }

    /// Append `product` with quantity one.
    ///
    /// The row is appended even if the product is already in the cart; the
    /// duplicate merges on the next aggregated read.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub fn add_item(&self, product: &ProductRecord) {
        let mut entries = self.items();
        entries.push(StoredEntry::from_product(product));
        self.persist(&entries);
    }

    /// Set the quantity of `id` to the sanitized `quantity`.
    #[instrument(skip_all, fields(product_id = %id))]
    pub fn set_quantity(&self, id: &ProductId, quantity: impl IntoQuantity) {
        let quantity = quantity.into_quantity();
        self.mutate(|items| {
            items
                .into_iter()
                .map(|item| {
                    if &item.id == id {
                        LineItem { quantity, ..item }
                    } else {
                        item
                    }
                })
                .collect()
        });
    }

    /// Change the quantity of `id` by `delta`.
    ///
    /// A result below one removes the line instead of clamping it.
    #[instrument(skip_all, fields(product_id = %id, delta))]
    pub fn adjust_quantity(&self, id: &ProductId, delta: i64) {
        self.mutate(|items| {
            items
                .into_iter()
                .filter_map(|item| {
                    if &item.id != id {
                        return Some(item);
                    }
                    let next = i64::from(item.quantity.get()).saturating_add(delta);
                    if next < i64::from(Quantity::MIN.get()) {
                        debug!(next, "Quantity fell below minimum; removing line");
                        return None;
                    }
                    Some(LineItem {
                        quantity: Quantity::sanitize_i64(next),
                        ..item
                    })
                })
                .collect()
        });
    }

    /// Remove `id` from the cart.
    #[instrument(skip_all, fields(product_id = %id))]
    pub fn remove_item(&self, id: &ProductId) {
        self.mutate(|items| items.into_iter().filter(|item| &item.id != id).collect());
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.persist(&[]);
    }

    /// Clear the cart, reporting whether the empty cart was written.
    #[must_use]
    pub(crate) fn try_clear(&self) -> bool {
        self.persist(&[])
    }

    fn mutate(&self, transform: impl FnOnce(Vec<LineItem>) -> Vec<LineItem>) {
        let items = transform(self.state().into_items());
        // Quantity cannot hold zero, so every remaining line meets the floor.
        let state = CartState::from_items(items);
        self.persist(&state.into_entries());
    }

    /// Write `entries` and publish a local event. Returns `false` when nothing was written.
    fn persist(&self, entries: &[StoredEntry]) -> bool {
        let value = match serde_json::to_value(entries) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to encode cart");
                return false;
            }
        };

        if let Err(e) = self.kv.set(keys::CART, &value) {
            warn!(error = %e, "Failed to persist cart");
            return false;
        }

        let delivered = self.events.publish(ChangeOrigin::Local);
        debug!(lines = entries.len(), delivered, "Cart persisted");
        true
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}
