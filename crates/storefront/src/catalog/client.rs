//! Static JSON catalog reader.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use gearup_core::{CategoryId, ProductRecord};
use moka::future::Cache;
use tracing::{debug, error, instrument};
use url::Url;

use super::{CatalogError, CatalogSource};

/// Where the `<category>.json` files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// A local directory.
    Directory(PathBuf),
    /// An HTTP(S) base URL.
    Remote(Url),
}

impl FromStr for CatalogLocation {
    type Err = url::ParseError;

    /// `http://` and `https://` values are URLs, anything else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            let mut url = Url::parse(s)?;
            // Url::join replaces the last segment unless the base ends in '/'.
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            Ok(Self::Remote(url))
        } else {
            Ok(Self::Directory(PathBuf::from(s)))
        }
    }
}

/// Catalog backed by static JSON files.
///
/// Cheap to clone; clones share the HTTP client and cache.
#[derive(Clone)]
pub struct StaticCatalog {
    inner: Arc<StaticCatalogInner>,
}

struct StaticCatalogInner {
    location: CatalogLocation,
    client: reqwest::Client,
    cache: Cache<CategoryId, Arc<Vec<ProductRecord>>>,
}

impl StaticCatalog {
    /// Create a catalog reading from `location`, caching listings for `ttl`.
    #[must_use]
    pub fn new(location: CatalogLocation, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(StaticCatalogInner {
                location,
                client: reqwest::Client::new(),
                cache,
            }),
        }
    }

    /// Where listings are read from.
    #[must_use]
    pub fn location(&self) -> &CatalogLocation {
        &self.inner.location
    }

    /// Fetch and parse one category file, bypassing the cache.
    async fn fetch(&self, category: &CategoryId) -> Result<Vec<ProductRecord>, CatalogError> {
        let file_name = format!("{category}.json");
        let body = match &self.inner.location {
            CatalogLocation::Directory(dir) => tokio::fs::read(dir.join(&file_name)).await?,
            CatalogLocation::Remote(base) => {
                let url = base
                    .join(&file_name)
                    .map_err(|_| CatalogError::InvalidCategory(category.to_string()))?;
                let response = self.inner.client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    error!(status = %status, "Catalog returned non-success status");
                    return Err(CatalogError::BadResponse(status.as_u16()));
                }
                response.bytes().await?.to_vec()
            }
        };

        Ok(serde_json::from_slice(&body)?)
    }

    /// Invalidate all cached listings.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl CatalogSource for StaticCatalog {
    #[instrument(skip(self), fields(category = %category))]
    async fn get_all(&self, category: &CategoryId) -> Result<Vec<ProductRecord>, CatalogError> {
        validate_slug(category)?;

        if let Some(products) = self.inner.cache.get(category).await {
            debug!("Cache hit for category");
            return Ok(products.as_ref().clone());
        }

        let products = self.fetch(category).await?;
        debug!(count = products.len(), "Loaded category");

        self.inner
            .cache
            .insert(category.clone(), Arc::new(products.clone()))
            .await;

        Ok(products)
    }
}

impl std::fmt::Debug for StaticCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCatalog")
            .field("location", &self.inner.location)
            .finish_non_exhaustive()
    }
}

/// Slugs become file names, so only `[a-z0-9-]` is allowed.
fn validate_slug(category: &CategoryId) -> Result<(), CatalogError> {
    let slug = category.as_str();
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidCategory(slug.to_owned()))
    }
}
