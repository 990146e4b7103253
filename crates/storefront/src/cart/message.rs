//! Order message handed to WhatsApp.
//!
//! One numbered entry per cart line (title, quantity, unit price, line
//! subtotal), then the item count and the grand total. The wording follows
//! the shopper's locale; the structure is the same in both languages.

use std::fmt::Write;

use rust_decimal::Decimal;

use souq_core::{CurrencyCode, Locale, Price};

use super::state::CartState;
use crate::catalog::single_line;

struct Texts {
    heading: &'static str,
    quantity: &'static str,
    unit_price: &'static str,
    subtotal: &'static str,
    items: &'static str,
    total: &'static str,
}

const EN: Texts = Texts {
    heading: "New order from Emirates Souq",
    quantity: "Qty",
    unit_price: "Unit price",
    subtotal: "Subtotal",
    items: "Items",
    total: "Total",
};

const AR: Texts = Texts {
    heading: "طلب جديد من سوق الإمارات",
    quantity: "الكمية",
    unit_price: "سعر الوحدة",
    subtotal: "المجموع",
    items: "عدد القطع",
    total: "الإجمالي",
};

const fn texts(locale: Locale) -> &'static Texts {
    match locale {
        Locale::En => &EN,
        Locale::Ar => &AR,
    }
}

fn money(amount: Decimal, currency: CurrencyCode, locale: Locale) -> String {
    Price::new(amount, currency).display_for(locale)
}

/// Render the cart as a line-delimited order summary.
///
/// Output is deterministic for a given state: lines appear in insertion
/// order and every amount is rounded to two decimals. Each cart line takes
/// exactly one line of text; titles are flattened onto one line first.
#[must_use]
pub fn render_order_message(state: &CartState, locale: Locale, currency: CurrencyCode) -> String {
    let t = texts(locale);
    let mut out = String::new();
    out.push_str(t.heading);
    out.push('\n');

    for (index, line) in state.lines().enumerate() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{}. {} - {}: {} - {}: {} - {}: {}",
            index + 1,
            single_line(&line.title),
            t.quantity,
            line.quantity,
            t.unit_price,
            money(line.unit_price, currency, locale),
            t.subtotal,
            money(line.line_total(), currency, locale),
        );
    }

    let totals = state.totals();
    let _ = writeln!(out, "{}: {}", t.items, totals.item_count);
    let _ = write!(
        out,
        "{}: {}",
        t.total,
        money(totals.total_amount, currency, locale)
    );
    out
}
