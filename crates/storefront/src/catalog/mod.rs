//! Product catalog.
//!
//! The catalog is a single JSON array of product objects. Records are
//! validated here, at the ingestion boundary, so that everything downstream
//! (the cart in particular) can trust a [`ProductRecord`] without re-checking
//! it. A record that fails validation is logged and skipped; it never takes
//! the rest of the catalog down with it.

mod loader;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use souq_core::ProductId;

pub use loader::{CatalogHandle, CatalogSource, CatalogStatus, load_catalog};

/// Errors that prevent a catalog from loading at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the catalog file failed.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request for the catalog failed.
    #[error("failed to fetch catalog: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog server answered with a non-success status.
    #[error("catalog request returned HTTP {0}")]
    HttpStatus(u16),

    /// The document is not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is JSON but not an array of products.
    #[error("invalid catalog format: expected an array of products")]
    NotAnArray,

    /// The catalog source string could not be interpreted.
    #[error("invalid catalog source {0:?}: {1}")]
    InvalidSource(String, String),
}

/// Reasons a single catalog record is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("missing or invalid id")]
    MissingId,
    #[error("title is blank")]
    BlankTitle,
    #[error("missing regular price")]
    MissingRegularPrice,
    #[error("price is negative")]
    NegativePrice,
    #[error("duplicate product id {0}")]
    Duplicate(ProductId),
}

/// A validated product, as supplied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl ProductRecord {
    /// Create a record with only the required fields.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, regular_price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            regular_price,
            sale_price: None,
            image_url: None,
            category: None,
        }
    }

    #[must_use]
    pub fn with_sale_price(mut self, sale_price: Decimal) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The price a shopper pays: the sale price when there is one, else the
    /// regular price. A zero sale price counts as no sale.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.sale_price
            .filter(|price| !price.is_zero())
            .unwrap_or(self.regular_price)
    }

    /// Whole-number percentage saved by the sale price, if it is a discount.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let sale = self.sale_price.filter(|price| !price.is_zero())?;
        if self.regular_price.is_zero() || sale >= self.regular_price {
            return None;
        }
        let saved = (self.regular_price - sale) / self.regular_price * Decimal::ONE_HUNDRED;
        saved.round().to_u32()
    }
}

/// Catalog record exactly as it appears in the JSON file.
#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    regular_price: Option<Decimal>,
    #[serde(default)]
    sale_price: Option<Decimal>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

fn parse_id(value: &serde_json::Value) -> Option<ProductId> {
    let id = match value {
        serde_json::Value::String(s) => ProductId::new(s),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                ProductId::from(u)
            } else {
                ProductId::from(n.as_i64()?)
            }
        }
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Collapse runs of whitespace and control characters into single spaces,
/// so the text always renders on one line.
pub(crate) fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

impl TryFrom<RawProduct> for ProductRecord {
    type Error = RecordError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let id = parse_id(&raw.id).ok_or(RecordError::MissingId)?;
        let title = raw
            .title
            .map(|title| single_line(&title))
            .filter(|title| !title.is_empty())
            .ok_or(RecordError::BlankTitle)?;
        let regular_price = raw.regular_price.ok_or(RecordError::MissingRegularPrice)?;
        if regular_price < Decimal::ZERO {
            return Err(RecordError::NegativePrice);
        }

        let mut sale_price = match raw.sale_price {
            Some(price) if price < Decimal::ZERO => {
                return Err(RecordError::NegativePrice);
            }
            Some(price) if price.is_zero() => None,
            other => other,
        };

        if sale_price.is_some_and(|sale| sale > regular_price) {
            warn!(
                product_id = %id,
                sale_price = ?sale_price,
                %regular_price,
                "Sale price above regular price, ignoring sale price"
            );
            sale_price = None;
        }

        Ok(Self {
            id,
            title,
            regular_price,
            sale_price,
            image_url: non_blank(raw.image_url),
            category: non_blank(raw.category),
        })
    }
}

/// Resolves product ids to records.
///
/// The cart is handed a lookup rather than a catalog so that callers can
/// supply whatever backs their products: a loaded [`Catalog`], a
/// [`CatalogHandle`] that may still be loading, or a plain closure.
pub trait CatalogLookup {
    /// Resolve `id`, or `None` if the product is unknown.
    fn lookup(&self, id: &ProductId) -> Option<ProductRecord>;
}

impl<F> CatalogLookup for F
where
    F: Fn(&ProductId) -> Option<ProductRecord>,
{
    fn lookup(&self, id: &ProductId) -> Option<ProductRecord> {
        self(id)
    }
}

/// An immutable, validated product catalog in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: IndexMap<ProductId, ProductRecord>,
    skipped: usize,
}

impl Catalog {
    /// Build a catalog from already-validated records. The first record for
    /// an id wins; later duplicates are counted as skipped.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            if let Err(e) = catalog.insert(record) {
                warn!(error = %e, "Skipping catalog record");
                catalog.skipped += 1;
            }
        }
        catalog
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] for invalid JSON and
    /// [`CatalogError::NotAnArray`] when the top level is not an array.
    /// Individual bad records are skipped, not reported as errors.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let document: serde_json::Value = serde_json::from_slice(bytes)?;
        let serde_json::Value::Array(entries) = document else {
            return Err(CatalogError::NotAnArray);
        };

        let mut catalog = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let result = serde_json::from_value::<RawProduct>(entry)
                .map_err(|e| RecordError::Malformed(e.to_string()))
                .and_then(ProductRecord::try_from)
                .and_then(|record| catalog.insert(record));

            if let Err(e) = result {
                warn!(index, error = %e, "Skipping catalog record");
                catalog.skipped += 1;
            }
        }

        debug!(
            products = catalog.len(),
            skipped = catalog.skipped,
            "Parsed catalog document"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog document from a string.
    ///
    /// # Errors
    ///
    /// See [`Catalog::from_json_slice`].
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_slice(json.as_bytes())
    }

    fn insert(&mut self, record: ProductRecord) -> Result<(), RecordError> {
        if self.products.contains_key(&record.id) {
            return Err(RecordError::Duplicate(record.id));
        }
        self.products.insert(record.id.clone(), record);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&ProductRecord> {
        self.products.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of records rejected while building this catalog.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.values()
    }

    /// Product count per category, in order of first appearance.
    #[must_use]
    pub fn category_counts(&self) -> IndexMap<&str, usize> {
        let mut counts = IndexMap::new();
        for category in self.products.values().filter_map(|p| p.category.as_deref()) {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }
}

impl CatalogLookup for Catalog {
    fn lookup(&self, id: &ProductId) -> Option<ProductRecord> {
        self.get(id).cloned()
    }
}
