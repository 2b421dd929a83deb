//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `GEARUP_STORAGE_PATH` - File backing the browser-style storage (default: .gearup/storage.json)
//! - `GEARUP_CATALOG` - Directory or `http(s)://` base URL of the category files (default: json)
//! - `GEARUP_DEFAULT_CATEGORY` - Category shown when none is given (default: tents)
//! - `GEARUP_CHECKOUT_DELAY_MS` - Simulated order submission latency (default: 1600)
//! - `GEARUP_CATALOG_CACHE_TTL_SECS` - Catalog listing cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use gearup_core::CategoryId;
use thiserror::Error;

use crate::catalog::CatalogLocation;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// JSON file holding the persisted storage area
    pub storage_path: PathBuf,
    /// Where category listings are read from
    pub catalog: CatalogLocation,
    /// Category used when none is requested
    pub default_category: CategoryId,
    /// How long a submitted order takes to "send"
    pub checkout_delay: Duration,
    /// Lifetime of cached catalog listings
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let storage_path = PathBuf::from(env.or_default("GEARUP_STORAGE_PATH", ".gearup/storage.json"));
        let catalog = env
            .or_default("GEARUP_CATALOG", "json")
            .parse::<CatalogLocation>()
            .map_err(|e| ConfigError::InvalidEnvVar("GEARUP_CATALOG".to_string(), e.to_string()))?;
        let default_category = CategoryId::new(env.or_default(
            "GEARUP_DEFAULT_CATEGORY",
            crate::catalog::DEFAULT_CATEGORY,
        ));
        let checkout_delay = Duration::from_millis(env.parse_or("GEARUP_CHECKOUT_DELAY_MS", 1600)?);
        let catalog_cache_ttl =
            Duration::from_secs(env.parse_or("GEARUP_CATALOG_CACHE_TTL_SECS", 300)?);

        Ok(Self {
            storage_path,
            catalog,
            default_category,
            checkout_delay,
            catalog_cache_ttl,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a numeric variable with a default value.
    fn parse_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
