//! Product catalog.
//!
//! # Architecture
//!
//! - The catalog is a set of static JSON files, one per category
//!   (`tents.json`, `backpacks.json`, ...), each an array of product records
//! - [`StaticCatalog`] reads them from a local directory or an HTTP base URL
//! - Listings are cached in memory via `moka` (5 minute TTL by default)
//! - The cart never calls the catalog; it only stores records the view layer
//!   obtained from it
//!
//! # Example
//!
//! ```rust,ignore
//! use gearup_storefront::catalog::{CatalogLocation, CatalogSource, StaticCatalog};
//!
//! let catalog = StaticCatalog::new("json".parse::<CatalogLocation>()?, Duration::from_secs(300));
//! let tents = catalog.get_all(&CategoryId::new("tents")).await?;
//! let tent = catalog.get_by_id(&CategoryId::new("tents"), &ProductId::new("880RR")).await?;
//! ```

mod client;

use std::future::Future;

use gearup_core::{CategoryId, ProductId, ProductRecord};
use thiserror::Error;

pub use client::{CatalogLocation, StaticCatalog};

/// Category shown when none is requested.
pub const DEFAULT_CATEGORY: &str = "tents";

/// A browsable product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Slug, also the catalog file stem.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Categories listed on the home page.
pub const CATEGORIES: &[Category] = &[
    Category {
        id: "tents",
        name: "Tents",
        description: "Weatherproof shelter for every expedition.",
        icon: "⛺",
    },
    Category {
        id: "backpacks",
        name: "Backpacks",
        description: "Smart, ergonomic carry for the long haul.",
        icon: "🎒",
    },
    Category {
        id: "sleeping-bags",
        name: "Sleeping Bags",
        description: "Guaranteed warm rest at camp.",
        icon: "🛏️",
    },
    Category {
        id: "hammocks",
        name: "Hammocks",
        description: "Unwind under the stars in total comfort.",
        icon: "🪢",
    },
];

/// Look up a listed category by slug.
#[must_use]
pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.id == id)
}

/// Errors that can occur when loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The category slug cannot name a catalog file.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Bad response: HTTP {0}")]
    BadResponse(u16),

    /// Reading a local catalog file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not an array of product records.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of product listings by category.
pub trait CatalogSource: Send + Sync {
    /// All products in `category`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the listing cannot be fetched or parsed.
    fn get_all(
        &self,
        category: &CategoryId,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, CatalogError>> + Send;

    /// One product of `category` by id, `None` if the listing lacks it.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the listing cannot be fetched or parsed.
    fn get_by_id(
        &self,
        category: &CategoryId,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<ProductRecord>, CatalogError>> + Send {
        async move {
            let products = self.get_all(category).await?;
            Ok(products.into_iter().find(|product| &product.id == id))
        }
    }
}
