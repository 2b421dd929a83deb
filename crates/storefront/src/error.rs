//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything a storefront command can
//! fail with. Failures of the storefront itself are captured to Sentry before
//! they are reported; customer mistakes are not.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog could not be read.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the storefront itself is at fault, as opposed to the user.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Catalog(_) => true,
            Self::Checkout(err) => matches!(
                err,
                CheckoutError::Encode(_) | CheckoutError::Storage(_)
            ),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing internal failures to Sentry first.
    pub fn capture(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "880RR")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 880RR".to_string());
        assert_eq!(err.to_string(), "Not found: product 880RR");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(
            err.to_string(),
            "Checkout error: Your cart is empty. Add items before submitting."
        );
    }

    #[test]
    fn test_internal_classification() {
        assert!(AppError::from(StorageError::Poisoned).is_internal());
        assert!(AppError::from(CatalogError::BadResponse(503)).is_internal());
        assert!(!AppError::from(CheckoutError::EmptyCart).is_internal());
        assert!(!AppError::from(CheckoutError::MissingField("zip")).is_internal());
        assert!(!AppError::BadRequest("quantity".to_string()).is_internal());
    }

    #[test]
    fn test_capture_without_client_is_noop() {
        AppError::NotFound("x".to_string()).capture();
        AppError::from(StorageError::Poisoned).capture();
        add_breadcrumb("cart", "Cleared cart", None);
    }
}
