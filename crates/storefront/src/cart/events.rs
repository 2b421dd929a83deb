//! `cart:updated` change signal.
//!
//! Every cart mutation publishes a [`CartUpdated`] to the store's local
//! subscribers. Writes made by other contexts reach the same subscribers,
//! relayed from the storage layer's change notification. Events carry no
//! cart data; receivers re-read the store.

use tokio::sync::broadcast;

/// Name of the change event, stable across the application.
pub const CART_UPDATED_EVENT: &str = "cart:updated";

/// Where a cart change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A mutation through this store.
    Local,
    /// A write made by another context sharing the storage.
    External,
}

/// Payload-free notice that the cart changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartUpdated {
    pub origin: ChangeOrigin,
}

impl CartUpdated {
    /// Event name, see [`CART_UPDATED_EVENT`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        CART_UPDATED_EVENT
    }
}

/// Broadcast channel for [`CartUpdated`] events.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartUpdated>,
}

impl CartEvents {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartUpdated> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, origin: ChangeOrigin) -> usize {
        self.sender.send(CartUpdated { origin }).unwrap_or(0)
    }
}
