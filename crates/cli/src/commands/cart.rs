//! Cart management commands.
//!
//! The cart lives in `STOREFRONT_STORAGE_DIR` under `STOREFRONT_CART_KEY`,
//! so it survives between invocations.
//!
//! # Usage
//!
//! ```bash
//! souq cart add P1
//! souq cart inc P1
//! souq cart dec P1
//! souq cart set P1 3
//! souq cart remove P1
//! souq cart show
//! souq cart clear
//! ```

use tracing::info;

use souq_core::ProductId;
use souq_storefront::cart::{AddOutcome, CartStore, FileStorage};
use souq_storefront::catalog::CatalogHandle;
use souq_storefront::config::StorefrontConfig;
use souq_storefront::error::{Result, StorefrontError};

use super::money;

/// Open the persisted cart described by `config`.
pub fn open(config: &StorefrontConfig) -> CartStore<FileStorage> {
    CartStore::open(FileStorage::new(&config.storage_dir), config.cart_settings())
}

/// Print every line, then the totals with VAT.
#[allow(clippy::print_stdout)]
pub fn show(config: &StorefrontConfig) {
    let store = open(config);
    if store.is_empty() {
        println!("Cart is empty");
        return;
    }

    for (index, line) in store.lines().enumerate() {
        println!(
            "{:>2}. {:<8} {:<32} x{:<4} {:>16}",
            index + 1,
            line.product_id.as_str(),
            line.title,
            line.quantity,
            money(config, line.line_total())
        );
    }

    let totals = store.aggregates();
    let vat = totals.vat(config.vat_rate);
    println!("Items:    {}", totals.item_count);
    println!("Subtotal: {}", money(config, vat.subtotal));
    println!("VAT:      {}", money(config, vat.vat));
    println!("Total:    {}", money(config, vat.total));
}

/// Add one unit of a product from the catalog.
///
/// The catalog loads in the background while the cart is read from disk.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or does not contain the
/// product, or if the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn add(config: &StorefrontConfig, id: &str) -> Result<()> {
    let (catalog, loading) = CatalogHandle::spawn_load(config.catalog_source.clone());
    let mut store = open(config);
    let product_id = ProductId::new(id);

    if let Err(e) = loading.await {
        return Err(StorefrontError::CatalogUnavailable(e.to_string()));
    }
    if let Some(message) = catalog.error() {
        return Err(StorefrontError::CatalogUnavailable(message));
    }

    match store.add_item(&product_id, &catalog) {
        AddOutcome::Added => println!("Added {product_id}"),
        AddOutcome::Incremented { quantity } => println!("{product_id} x{quantity}"),
        AddOutcome::NotFound => {
            return Err(StorefrontError::NotFound(format!("product {product_id}")));
        }
    }
    store.flush()?;
    info!(product_id = %product_id, items = store.aggregates().item_count, "Cart updated");
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the cart has no line for it, or
/// a storage error if the cart cannot be saved.
#[allow(clippy::print_stdout)]
pub fn remove(config: &StorefrontConfig, id: &str) -> Result<()> {
    let mut store = open(config);
    let product_id = ProductId::new(id);
    if !store.remove_item(&product_id) {
        return Err(not_in_cart(&product_id));
    }
    store.flush()?;
    println!("Removed {product_id}");
    Ok(())
}

/// Add one to a line already in the cart.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the cart has no line for it, or
/// a storage error if the cart cannot be saved.
pub fn increment(config: &StorefrontConfig, id: &str) -> Result<()> {
    let mut store = open(config);
    let product_id = ProductId::new(id);
    if !store.increment(&product_id) {
        return Err(not_in_cart(&product_id));
    }
    store.flush()?;
    report_quantity(&store, &product_id);
    Ok(())
}

/// Take one off a line; the line goes away when it reaches zero.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the cart has no line for it, or
/// a storage error if the cart cannot be saved.
pub fn decrement(config: &StorefrontConfig, id: &str) -> Result<()> {
    let mut store = open(config);
    let product_id = ProductId::new(id);
    if !store.decrement(&product_id) {
        return Err(not_in_cart(&product_id));
    }
    store.flush()?;
    report_quantity(&store, &product_id);
    Ok(())
}

/// Set a line's quantity; zero or less removes the line.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] if the cart has no line for it, or
/// a storage error if the cart cannot be saved.
pub fn set(config: &StorefrontConfig, id: &str, quantity: i64) -> Result<()> {
    let mut store = open(config);
    let product_id = ProductId::new(id);
    if !store.set_quantity(&product_id, quantity) {
        return Err(not_in_cart(&product_id));
    }
    store.flush()?;
    report_quantity(&store, &product_id);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns a storage error if the empty cart cannot be saved.
#[allow(clippy::print_stdout)]
pub fn clear(config: &StorefrontConfig) -> Result<()> {
    let mut store = open(config);
    store.clear();
    store.flush()?;
    println!("Cart cleared");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn report_quantity(store: &CartStore<FileStorage>, id: &ProductId) {
    match store.state().get(id) {
        Some(line) => println!("{id} x{}", line.quantity),
        None => println!("Removed {id}"),
    }
}

fn not_in_cart(id: &ProductId) -> StorefrontError {
    StorefrontError::NotFound(format!("{id} is not in the cart"))
}
