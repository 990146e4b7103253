//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;

use rust_decimal::Decimal;

use souq_core::Price;
use souq_storefront::config::StorefrontConfig;

/// Format an amount in the configured currency and language.
fn money(config: &StorefrontConfig, amount: Decimal) -> String {
    Price::new(amount, config.currency).display_for(config.locale)
}
