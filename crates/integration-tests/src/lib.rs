//! End-to-end tests for the Emirates Souq storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souq-integration-tests
//! ```
//!
//! Each test gets a [`TestShop`]: a scratch directory holding a catalog file
//! and the file-backed cart storage, plus a configuration pointing at both.
//! Nothing outside the temporary directory is touched.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

use souq_storefront::cart::{CartStore, FileStorage};
use souq_storefront::config::{ConfigError, StorefrontConfig};

/// WhatsApp number used by every fixture.
pub const TEST_WHATSAPP_NUMBER: &str = "+971501234567";

/// The two-product catalog most scenarios start from.
#[must_use]
pub fn sample_catalog() -> Value {
    json!([
        {"id": "P1", "title": "Fan", "regular_price": 60, "sale_price": 50, "category": "Cooling"},
        {"id": "P2", "title": "Lamp", "regular_price": 30, "image_url": "https://cdn.example.com/lamp.jpg"},
        {"id": "P3", "title": "Kettle", "regular_price": 80, "sale_price": 0, "category": "Kitchen"}
    ])
}

/// Scratch storefront rooted in a temporary directory.
pub struct TestShop {
    dir: TempDir,
    catalog_path: PathBuf,
    overrides: HashMap<String, String>,
}

impl TestShop {
    /// Create a shop whose catalog file contains `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or catalog file cannot be
    /// created.
    pub fn new(catalog: &Value) -> io::Result<Self> {
        Self::with_catalog_text(&catalog.to_string())
    }

    /// Create a shop whose catalog file holds `text` verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or catalog file cannot be
    /// created.
    pub fn with_catalog_text(text: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let catalog_path = dir.path().join("products.json");
        fs::write(&catalog_path, text)?;
        Ok(Self {
            dir,
            catalog_path,
            overrides: HashMap::new(),
        })
    }

    /// Override an environment variable for [`TestShop::config`].
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.overrides.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.dir.path().join("cart")
    }

    /// Configuration pointing at this shop's files.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid.
    pub fn config(&self) -> Result<StorefrontConfig, ConfigError> {
        let mut vars = HashMap::from([
            (
                "STOREFRONT_WHATSAPP_NUMBER".to_owned(),
                TEST_WHATSAPP_NUMBER.to_owned(),
            ),
            (
                "STOREFRONT_CATALOG_SOURCE".to_owned(),
                self.catalog_path.display().to_string(),
            ),
            (
                "STOREFRONT_STORAGE_DIR".to_owned(),
                self.storage_dir().display().to_string(),
            ),
        ]);
        vars.extend(self.overrides.clone());
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    /// Open the file-backed cart store for `config`.
    #[must_use]
    pub fn open_cart(config: &StorefrontConfig) -> CartStore<FileStorage> {
        CartStore::open(FileStorage::new(&config.storage_dir), config.cart_settings())
    }

    /// Path of the persisted cart file for `config`.
    #[must_use]
    pub fn cart_file(config: &StorefrontConfig) -> PathBuf {
        config.storage_dir.join(format!("{}.json", config.cart_key))
    }
}
