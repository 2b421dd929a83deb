//! Application state shared across commands.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::StaticCatalog;
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::storage::{PersistentKv, StorageArea, StorageError};

/// Application state for one storefront execution context.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart, catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    area: StorageArea,
    catalog: StaticCatalog,
    cart: Arc<CartStore>,
    checkout: Checkout,
}

impl AppState {
    /// Open the configured storage area and attach a new context to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file exists but cannot be read.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorageError> {
        let area = StorageArea::open(&config.storage_path)?;
        Ok(Self::with_area(config, area))
    }

    /// Build the state over an already open storage area.
    #[must_use]
    pub fn with_area(config: StorefrontConfig, area: StorageArea) -> Self {
        let kv: Arc<dyn PersistentKv> = Arc::new(area.context());
        let cart = Arc::new(CartStore::new(kv));
        let checkout = Checkout::new(Arc::clone(&cart), config.checkout_delay);
        let catalog = StaticCatalog::new(config.catalog.clone(), config.catalog_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                area,
                catalog,
                cart,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared storage area.
    #[must_use]
    pub fn area(&self) -> &StorageArea {
        &self.inner.area
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &StaticCatalog {
        &self.inner.catalog
    }

    /// Get a reference to this context's cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the checkout.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("area", &self.inner.area)
            .finish_non_exhaustive()
    }
}
