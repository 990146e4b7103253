//! Unified error handling for storefront front ends.
//!
//! Cart operations never fail, so everything here comes from the edges:
//! configuration, catalog loading, storage access outside the cart store,
//! and building the checkout link.

use thiserror::Error;

use crate::cart::StorageError;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A background catalog load failed or never finished.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The cart could not be saved.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The checkout link could not be built.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorefrontError {
    /// Process exit code for command-line front ends.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::NotFound(_) | Self::Checkout(CheckoutError::EmptyCart) => 1,
            Self::Catalog(_)
            | Self::CatalogUnavailable(_)
            | Self::Storage(_)
            | Self::Checkout(_) => 74,
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use souq_core::ProductId;

    use super::*;
    use crate::cart::{CartSettings, CartStore, MemoryStorage};
    use crate::catalog::ProductRecord;

    #[test]
    fn test_error_display() {
        let err = StorefrontError::NotFound("product P404".to_string());
        assert_eq!(err.to_string(), "Not found: product P404");

        let err = StorefrontError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            StorefrontError::from(ConfigError::MissingEnvVar("X".to_string())).exit_code(),
            78
        );
        assert_eq!(StorefrontError::from(CheckoutError::EmptyCart).exit_code(), 1);
        assert_eq!(
            StorefrontError::from(CatalogError::NotAnArray).exit_code(),
            74
        );
    }

    #[test]
    fn test_unsaved_cart_surfaces_as_storage_error() {
        let mut store = CartStore::open(
            MemoryStorage::with_capacity_bytes(16),
            CartSettings::default(),
        );
        let fan = |_: &ProductId| Some(ProductRecord::new("P1", "Fan", Decimal::from(50)));
        store.add_item(&ProductId::new("P1"), &fan);

        let err = StorefrontError::from(store.flush().unwrap_err());
        assert!(matches!(
            err,
            StorefrontError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(err.exit_code(), 74);
    }
}
