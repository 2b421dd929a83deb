//! Persistent key-value storage shared between execution contexts.
//!
//! # Model
//!
//! A [`StorageArea`] is the storage of one origin: a map from key to JSON
//! text, optionally backed by a file so it survives restarts. Each open page
//! or process attaches to it as a [`StorageContext`]. Writes through one
//! context notify the handlers registered by every *other* context for the
//! same key, never the writer itself. Handlers receive only the key name and
//! must re-read the value.
//!
//! Code above this module depends on the [`PersistentKv`] trait rather than on
//! a concrete area, so tests can hand a store an isolated in-memory context.

mod area;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub use area::{StorageArea, StorageContext};

/// Well-known storage keys.
pub mod keys {
    /// Key holding the persisted cart (a JSON array of line items).
    pub const CART: &str = "gearup-cart";

    /// Key holding the most recently submitted order.
    pub const LAST_ORDER: &str = "gearup-last-order";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The text stored under a key is not valid JSON.
    #[error("Malformed value under {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file could not be encoded.
    #[error("Failed to encode storage file: {0}")]
    Encode(#[source] serde_json::Error),

    /// Another thread panicked while holding the storage lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Callback invoked with the key name when another context changes it.
pub type ChangeHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Synchronous key → JSON value store with cross-context change notification.
pub trait PersistentKv: Send + Sync {
    /// Read the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] when the stored text is not JSON.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Register `handler` for writes to `key` made by other contexts.
    ///
    /// The registration lasts until the returned [`Subscription`] is dropped.
    fn on_external_change(&self, key: &str, handler: ChangeHandler) -> Subscription;
}

/// Guard for a change handler registration. Dropping it unregisters.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` when dropped.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to unregister.
    pub fn detached() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
