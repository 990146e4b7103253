//! WhatsApp checkout command.
//!
//! Prints the `wa.me` link that opens a chat with the store, prefilled with
//! the order message. The cart is left as it is; the shopper clears it once
//! the order is sent.

use souq_storefront::checkout::checkout_url;
use souq_storefront::config::StorefrontConfig;
use souq_storefront::error::Result;

use super::cart::open;

/// Print the checkout link, and the message itself when `with_message` is set.
///
/// # Errors
///
/// Returns an error if the cart is empty or the link cannot be built.
#[allow(clippy::print_stdout)]
pub fn run(config: &StorefrontConfig, with_message: bool) -> Result<()> {
    let store = open(config);
    let url = checkout_url(&store, &config.whatsapp_number)?;

    if with_message {
        println!("{}", store.render_order_message());
        println!();
    }
    println!("{url}");
    Ok(())
}
