//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_WHATSAPP_NUMBER` - Number orders are sent to (e.g., +971501234567)
//!
//! ## Optional
//! - `STOREFRONT_CATALOG_SOURCE` - Catalog JSON path or URL (default: data/products.json)
//! - `STOREFRONT_STORAGE_DIR` - Directory holding the persisted cart (default: .souq)
//! - `STOREFRONT_CART_KEY` - Key the cart is stored under (default: `emirates_cart`)
//! - `STOREFRONT_CURRENCY` - ISO 4217 currency code (default: AED)
//! - `STOREFRONT_LOCALE` - `en` or `ar` (default: en)
//! - `STOREFRONT_VAT_RATE` - VAT as a fraction, 0 to 1 (default: 0.05)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use souq_core::{CurrencyCode, Locale, WhatsAppNumber};

use crate::cart::{CartSettings, DEFAULT_STORAGE_KEY};
use crate::catalog::CatalogSource;

const DEFAULT_CATALOG_SOURCE: &str = "data/products.json";
const DEFAULT_STORAGE_DIR: &str = ".souq";
const DEFAULT_VAT_RATE: &str = "0.05";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where the product catalog is loaded from
    pub catalog_source: CatalogSource,
    /// Directory for the file-backed cart storage
    pub storage_dir: PathBuf,
    /// Key the cart is persisted under
    pub cart_key: String,
    /// WhatsApp number that receives orders
    pub whatsapp_number: WhatsAppNumber,
    /// Currency prices are shown in
    pub currency: CurrencyCode,
    /// Shopper-facing language
    pub locale: Locale,
    /// VAT rate as a fraction (0.05 = 5%)
    pub vat_rate: Decimal,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let catalog_source = env
            .get_or_default("STOREFRONT_CATALOG_SOURCE", DEFAULT_CATALOG_SOURCE)
            .parse::<CatalogSource>()
            .map_err(|e| invalid("STOREFRONT_CATALOG_SOURCE", e))?;
        let storage_dir = PathBuf::from(env.get_or_default("STOREFRONT_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let cart_key = env.get_or_default("STOREFRONT_CART_KEY", DEFAULT_STORAGE_KEY);
        let whatsapp_number = env
            .get_required("STOREFRONT_WHATSAPP_NUMBER")?
            .parse::<WhatsAppNumber>()
            .map_err(|e| invalid("STOREFRONT_WHATSAPP_NUMBER", e))?;
        let currency = env
            .get_or_default("STOREFRONT_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| invalid("STOREFRONT_CURRENCY", e))?;
        let locale = env
            .get_or_default("STOREFRONT_LOCALE", Locale::default().tag())
            .parse::<Locale>()
            .map_err(|e| invalid("STOREFRONT_LOCALE", e))?;
        let vat_rate = parse_vat_rate(&env.get_or_default("STOREFRONT_VAT_RATE", DEFAULT_VAT_RATE))?;
        let sentry_dsn = env.get_optional("SENTRY_DSN");

        Ok(Self {
            catalog_source,
            storage_dir,
            cart_key,
            whatsapp_number,
            currency,
            locale,
            vat_rate,
            sentry_dsn,
        })
    }

    /// Settings for a cart store built from this configuration.
    #[must_use]
    pub fn cart_settings(&self) -> CartSettings {
        CartSettings {
            storage_key: self.cart_key.clone(),
            currency: self.currency,
            locale: self.locale,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable. Blank counts as missing.
    fn get_required(&self, key: &str) -> Result<String, ConfigError> {
        self.get_optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank counts as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Parse a VAT rate, which must be a fraction between 0 and 1.
fn parse_vat_rate(value: &str) -> Result<Decimal, ConfigError> {
    let rate = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| invalid("STOREFRONT_VAT_RATE", e))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(invalid(
            "STOREFRONT_VAT_RATE",
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}
