//! Integration tests for the GearUp storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gearup-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Cart consistency across execution contexts sharing storage
//! - `checkout_flow` - Catalog to cart to order confirmation
//!
//! Each test builds a [`TestStorefront`]: a temporary directory holding a
//! small catalog and the storage file. Every [`TestStorefront::tab`] is a
//! separate execution context attached to the same storage area, like two
//! browser tabs of one origin.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use gearup_storefront::config::StorefrontConfig;
use gearup_storefront::state::AppState;
use gearup_storefront::storage::StorageArea;
use serde_json::json;
use tempfile::TempDir;

/// A throwaway storefront: catalog files plus one shared storage area.
pub struct TestStorefront {
    _dir: TempDir,
    area: StorageArea,
    config: StorefrontConfig,
}

impl TestStorefront {
    /// Create the catalog and an empty file-backed storage area.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be prepared.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let catalog_dir = dir.path().join("json");
        write_catalog(&catalog_dir);

        let storage_path = dir.path().join("storage.json");
        let catalog = catalog_dir.to_string_lossy().into_owned();
        let storage = storage_path.to_string_lossy().into_owned();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "GEARUP_CATALOG" => Some(catalog.clone()),
            "GEARUP_STORAGE_PATH" => Some(storage.clone()),
            "GEARUP_CHECKOUT_DELAY_MS" => Some("0".to_string()),
            _ => None,
        })
        .expect("valid test config");

        let area = StorageArea::open(&config.storage_path).expect("open storage");
        Self {
            _dir: dir,
            area,
            config,
        }
    }

    /// A new execution context on the shared storage area.
    #[must_use]
    pub fn tab(&self) -> AppState {
        AppState::with_area(self.config.clone(), self.area.clone())
    }

    /// A context on a freshly opened area, as after a browser restart.
    ///
    /// # Panics
    ///
    /// Panics if the storage file cannot be read.
    #[must_use]
    pub fn reopen(&self) -> AppState {
        AppState::new(self.config.clone()).expect("reopen storage")
    }

    #[must_use]
    pub fn area(&self) -> &StorageArea {
        &self.area
    }
}

impl Default for TestStorefront {
    fn default() -> Self {
        Self::new()
    }
}

fn write_catalog(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create catalog dir");

    let tents = json!([
        {
            "Id": "880RR",
            "Name": "Marmot Ajax Tent - 3-Person, 3-Season",
            "Price": 199.99,
            "Image": "../images/tents/marmot-ajax-tent-3-person-3-season-in-pale-pumpkin-terracotta~p~880rr_01~320.jpg",
            "Tagline": "Roomy three-season shelter",
            "Features": ["Two doors", "Two vestibules"]
        },
        {
            "Id": "985RF",
            "Name": "The North Face Talus Tent - 4-Person, 3-Season",
            "Price": 199.99,
            "ImageAlt": "Green four person tent"
        },
        {
            "Id": "344YJ",
            "Name": "Cedar Ridge Rimrock Tent - 2-Person, 3-Season",
            "Price": 69.99
        }
    ]);
    let backpacks = json!([
        {
            "Id": "BP100",
            "Name": "Summit Trail 45L Pack",
            "Price": 1250,
            "Includes": ["Rain cover"]
        }
    ]);

    std::fs::write(dir.join("tents.json"), tents.to_string()).expect("write tents");
    std::fs::write(dir.join("backpacks.json"), backpacks.to_string()).expect("write backpacks");
    std::fs::write(dir.join("sleeping-bags.json"), "[]").expect("write sleeping bags");
}
