//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! souq catalog list
//! souq catalog list --category lighting
//! souq catalog show P1
//! souq catalog ask P1
//! ```

use tracing::info;

use souq_core::ProductId;
use souq_storefront::catalog::{Catalog, ProductRecord, load_catalog};
use souq_storefront::checkout::inquiry_url;
use souq_storefront::config::StorefrontConfig;
use souq_storefront::error::{Result, StorefrontError};

use super::money;

/// List products, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn list(config: &StorefrontConfig, category: Option<&str>) -> Result<()> {
    let catalog = load_catalog(&config.catalog_source).await?;

    let mut shown = 0_usize;
    for product in catalog.iter().filter(|p| in_category(p, category)) {
        println!("{}", summary_line(config, product));
        shown += 1;
    }

    if category.is_none() {
        for (name, count) in catalog.category_counts() {
            println!("  [{name}] {count}");
        }
    }
    info!(shown, total = catalog.len(), "Listed catalog");
    Ok(())
}

/// Show the details of one product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the product is unknown.
#[allow(clippy::print_stdout)]
pub async fn show(config: &StorefrontConfig, id: &str) -> Result<()> {
    let catalog = load_catalog(&config.catalog_source).await?;
    let product = find(&catalog, id)?;

    println!("ID:       {}", product.id);
    println!("Title:    {}", product.title);
    println!("Price:    {}", money(config, product.unit_price()));
    if let Some(percent) = product.discount_percent() {
        println!(
            "Regular:  {} (-{percent}%)",
            money(config, product.regular_price)
        );
    }
    if let Some(category) = &product.category {
        println!("Category: {category}");
    }
    if let Some(image) = &product.image_url {
        println!("Image:    {image}");
    }
    Ok(())
}

/// Print a WhatsApp link asking about one product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the product is unknown,
/// or the link cannot be built.
#[allow(clippy::print_stdout)]
pub async fn ask(config: &StorefrontConfig, id: &str) -> Result<()> {
    let catalog = load_catalog(&config.catalog_source).await?;
    let product = find(&catalog, id)?;
    let url = inquiry_url(&config.whatsapp_number, product, config.locale, config.currency)?;
    println!("{url}");
    Ok(())
}

fn find<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a ProductRecord> {
    catalog
        .get(&ProductId::new(id))
        .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))
}

fn in_category(product: &ProductRecord, category: Option<&str>) -> bool {
    category.is_none_or(|wanted| {
        product
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(wanted))
    })
}

fn summary_line(config: &StorefrontConfig, product: &ProductRecord) -> String {
    let sale = product
        .discount_percent()
        .map(|percent| format!(" (-{percent}%)"))
        .unwrap_or_default();
    format!(
        "{:<8} {:<40} {}{sale}",
        product.id.as_str(),
        product.title,
        money(config, product.unit_price())
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_in_category() {
        let fan = ProductRecord::new("P1", "Fan", Decimal::from(50)).with_category("Cooling");
        let bare = ProductRecord::new("P2", "Lamp", Decimal::from(30));

        assert!(in_category(&fan, None));
        assert!(in_category(&fan, Some("cooling")));
        assert!(!in_category(&fan, Some("lighting")));
        assert!(in_category(&bare, None));
        assert!(!in_category(&bare, Some("lighting")));
    }
}
