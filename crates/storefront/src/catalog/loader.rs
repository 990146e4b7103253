//! Catalog loading from disk or over HTTP.
//!
//! The storefront is usable before the catalog arrives. [`CatalogHandle`]
//! starts out `Loading`, a background task swaps in the parsed catalog when
//! it is ready, and until then every lookup simply misses. A failed load is
//! kept as a message for the front end to show; there is no retry.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use url::Url;

use souq_core::ProductId;

use super::{Catalog, CatalogError, CatalogLookup, ProductRecord};

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A JSON file on the local filesystem.
    File(PathBuf),
    /// A JSON document served over HTTP(S).
    Url(Url),
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for CatalogSource {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::InvalidSource(
                s.to_owned(),
                "source is empty".to_string(),
            ));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| CatalogError::InvalidSource(s.to_owned(), e.to_string()))?;
            return Ok(Self::Url(url));
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

/// Load and validate the catalog once. No retry.
///
/// # Errors
///
/// Returns an error if the document cannot be read or fetched, if the server
/// answers with a non-success status, or if the document is not a JSON array.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_catalog(source: &CatalogSource) -> Result<Catalog, CatalogError> {
    let body = match source {
        CatalogSource::File(path) => tokio::fs::read(path).await?,
        CatalogSource::Url(url) => fetch(url).await?,
    };

    let catalog = Catalog::from_json_slice(&body)?;
    info!(
        products = catalog.len(),
        skipped = catalog.skipped(),
        "Catalog loaded"
    );
    Ok(catalog)
}

async fn fetch(url: &Url) -> Result<Vec<u8>, CatalogError> {
    let response = reqwest::Client::new().get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::HttpStatus(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}

/// Load state of a [`CatalogHandle`].
#[derive(Debug, Clone, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Ready(Arc<Catalog>),
    Failed(String),
}

/// Shared, possibly still loading catalog.
///
/// Cheap to clone; all clones observe the same load.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    inner: Arc<RwLock<CatalogStatus>>,
}

impl CatalogHandle {
    /// Create a handle in the `Loading` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that is already ready.
    #[must_use]
    pub fn ready(catalog: Catalog) -> Self {
        let handle = Self::new();
        handle.set(CatalogStatus::Ready(Arc::new(catalog)));
        handle
    }

    /// Start loading `source` in the background.
    ///
    /// Returns the handle immediately. The join handle may be awaited or
    /// dropped; dropping it does not cancel the load.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn_load(source: CatalogSource) -> (Self, JoinHandle<()>) {
        let handle = Self::new();
        let task_handle = handle.clone();
        info!(source = %source, "Spawning background catalog load");

        let join = tokio::spawn(async move {
            match load_catalog(&source).await {
                Ok(catalog) => task_handle.set(CatalogStatus::Ready(Arc::new(catalog))),
                Err(e) => {
                    error!(error = %e, "Failed to load catalog");
                    task_handle.set(CatalogStatus::Failed(e.to_string()));
                }
            }
        });

        (handle, join)
    }

    /// Current load state.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        self.inner.read().map_or_else(
            |_| CatalogStatus::Failed("catalog lock poisoned".to_string()),
            |guard| guard.clone(),
        )
    }

    /// The catalog, once loaded.
    #[must_use]
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        match self.status() {
            CatalogStatus::Ready(catalog) => Some(catalog),
            CatalogStatus::Loading | CatalogStatus::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.status(), CatalogStatus::Ready(_))
    }

    /// The load failure, for the front end's error indicator.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        match self.status() {
            CatalogStatus::Failed(message) => Some(message),
            CatalogStatus::Loading | CatalogStatus::Ready(_) => None,
        }
    }

    fn set(&self, status: CatalogStatus) {
        match self.inner.write() {
            Ok(mut guard) => *guard = status,
            Err(_) => error!("Catalog lock poisoned, dropping status update"),
        }
    }
}

impl CatalogLookup for CatalogHandle {
    fn lookup(&self, id: &ProductId) -> Option<ProductRecord> {
        self.catalog()?.get(id).cloned()
    }
}
