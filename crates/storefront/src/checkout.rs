//! WhatsApp hand-off.
//!
//! Orders are not placed here. The storefront builds a `wa.me` deep link
//! whose `text` parameter carries the order message, and the shopper sends
//! it from their own WhatsApp.

use thiserror::Error;
use tracing::info;
use url::Url;

use souq_core::{CurrencyCode, Locale, Price, WhatsAppNumber};

use crate::cart::{CartStorage, CartStore};
use crate::catalog::ProductRecord;

/// Base of every WhatsApp click-to-chat link.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Errors building a checkout link.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The link could not be assembled.
    #[error("invalid checkout URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Deep link that opens a chat with `number` prefilled with `message`.
///
/// # Errors
///
/// Returns [`CheckoutError::Url`] if the link cannot be parsed.
pub fn whatsapp_order_url(number: &WhatsAppNumber, message: &str) -> Result<Url, CheckoutError> {
    let link = format!(
        "{WHATSAPP_BASE_URL}{}?text={}",
        number.as_str(),
        urlencoding::encode(message)
    );
    Ok(Url::parse(&link)?)
}

/// Deep link carrying the cart's order message.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when the cart has no lines.
pub fn checkout_url<S: CartStorage>(
    store: &CartStore<S>,
    number: &WhatsAppNumber,
) -> Result<Url, CheckoutError> {
    if store.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = store.aggregates();
    info!(
        lines = store.state().len(),
        items = totals.item_count,
        total = %totals.total_amount,
        "Prepared WhatsApp checkout"
    );
    whatsapp_order_url(number, &store.render_order_message())
}

/// Single-product inquiry text, as sent from a product card.
#[must_use]
pub fn inquiry_message(product: &ProductRecord, locale: Locale, currency: CurrencyCode) -> String {
    let price = Price::new(product.unit_price(), currency);
    match locale {
        Locale::En => format!("I'd like to ask about {} - {price}", product.title),
        Locale::Ar => format!(
            "أريد الاستفسار عن {} - {}",
            product.title,
            price.display_arabic()
        ),
    }
}

/// Deep link for asking about one product.
///
/// # Errors
///
/// Returns [`CheckoutError::Url`] if the link cannot be parsed.
pub fn inquiry_url(
    number: &WhatsAppNumber,
    product: &ProductRecord,
    locale: Locale,
    currency: CurrencyCode,
) -> Result<Url, CheckoutError> {
    whatsapp_order_url(number, &inquiry_message(product, locale, currency))
}
