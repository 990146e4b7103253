//! Cart lines, the cart aggregate, and its persisted form.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use souq_core::ProductId;
use souq_core::price::round_money;

use crate::catalog::ProductRecord;

/// One product-quantity pairing in the cart.
///
/// Serialized with camelCase keys; this is the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl CartLine {
    /// Snapshot a catalog record as a new line with quantity 1.
    pub(crate) fn from_record(record: &ProductRecord, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: record.id.clone(),
            title: record.title.clone(),
            unit_price: record.unit_price(),
            image_ref: record.image_url.clone(),
            quantity: 1,
            added_at: Some(added_at),
        }
    }

    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    fn is_valid(&self) -> bool {
        self.quantity >= 1 && !self.product_id.is_empty() && self.unit_price >= Decimal::ZERO
    }
}

/// Item count and money total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub item_count: u64,
    /// Sum of line totals, rounded to two decimals.
    pub total_amount: Decimal,
}

impl CartTotals {
    /// Split the total into subtotal, VAT at `rate`, and the amount due.
    #[must_use]
    pub fn vat(&self, rate: Decimal) -> VatBreakdown {
        let vat = round_money(self.total_amount.saturating_mul(rate));
        VatBreakdown {
            subtotal: self.total_amount,
            vat,
            total: self.total_amount.saturating_add(vat),
        }
    }
}

/// Cart total with value-added tax applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatBreakdown {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

/// All lines in the cart, keyed by product and kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartState {
    lines: IndexMap<ProductId, CartLine>,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.contains_key(id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Exact sum of line totals.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.lines
            .values()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.line_total()))
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.item_count(),
            total_amount: round_money(self.total_amount()),
        }
    }

    pub(super) fn lines_mut(&mut self) -> &mut IndexMap<ProductId, CartLine> {
        &mut self.lines
    }

    /// Serialize to the persisted layout: a JSON array of lines.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_persisted_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines.values().collect::<Vec<_>>())
    }

    /// Parse the persisted layout.
    ///
    /// A document that parses but breaks the cart invariants is repaired
    /// rather than rejected: invalid lines are dropped and repeated products
    /// are merged by adding their quantities.
    ///
    /// A line that does not even have the line shape (a negative quantity,
    /// a missing title) is dropped on its own; the rest of the cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON array.
    pub fn from_persisted_json(json: &str) -> Result<Self, serde_json::Error> {
        let persisted: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut state = Self::new();

        for (index, entry) in persisted.into_iter().enumerate() {
            let line = match serde_json::from_value::<CartLine>(entry) {
                Ok(line) => line,
                Err(e) => {
                    warn!(index, error = %e, "Dropping malformed persisted cart line");
                    continue;
                }
            };
            if !line.is_valid() {
                warn!(
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "Dropping invalid persisted cart line"
                );
                continue;
            }
            match state.lines.entry(line.product_id.clone()) {
                Entry::Occupied(mut existing) => {
                    warn!(product_id = %line.product_id, "Merging duplicate persisted cart line");
                    let existing = existing.get_mut();
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                Entry::Vacant(slot) => {
                    slot.insert(line);
                }
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(id: &str, price: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            unit_price: price.parse().unwrap(),
            image_ref: None,
            quantity,
            added_at: None,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line("P1", "12.50", 3).line_total(), dec("37.50"));
    }

    #[test]
    fn test_persisted_layout_uses_camel_case() {
        let mut state = CartState::new();
        state.lines_mut().insert(ProductId::new("P1"), line("P1", "50", 2));

        let json = state.to_persisted_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["productId"], "P1");
        assert_eq!(first["quantity"], 2);
        assert!(first.get("unitPrice").is_some());
        assert!(first.get("imageRef").is_some());
    }

    #[test]
    fn test_persisted_numeric_prices_are_accepted() {
        let json = r#"[{"productId": "P1", "title": "Fan", "unitPrice": 49.99, "quantity": 1}]"#;
        let state = CartState::from_persisted_json(json).unwrap();
        assert_eq!(state.get(&ProductId::new("P1")).unwrap().unit_price, dec("49.99"));
    }

    #[test]
    fn test_persisted_invalid_lines_are_dropped() {
        let json = r#"[
            {"productId": "P1", "title": "Fan", "unitPrice": "5", "quantity": 0},
            {"productId": "", "title": "Blank", "unitPrice": "5", "quantity": 1},
            {"productId": "P3", "title": "Neg", "unitPrice": "-5", "quantity": 1},
            {"productId": "P4", "title": "Ok", "unitPrice": "5", "quantity": 2}
        ]"#;
        let state = CartState::from_persisted_json(json).unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.contains(&ProductId::new("P4")));
    }

    #[test]
    fn test_persisted_duplicates_merge() {
        let json = r#"[
            {"productId": "P1", "title": "Fan", "unitPrice": "5", "quantity": 2},
            {"productId": "P2", "title": "Lamp", "unitPrice": "3", "quantity": 1},
            {"productId": "P1", "title": "Fan again", "unitPrice": "9", "quantity": 3}
        ]"#;
        let state = CartState::from_persisted_json(json).unwrap();
        let fan = state.get(&ProductId::new("P1")).unwrap();
        assert_eq!(fan.quantity, 5);
        assert_eq!(fan.title, "Fan");
        let order: Vec<_> = state.lines().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, ["P1", "P2"]);
    }

    #[test]
    fn test_persisted_malformed_lines_do_not_lose_the_cart() {
        let json = r#"[
            {"productId": "P1", "title": "Fan", "unitPrice": "50", "quantity": 2},
            {"productId": "P2", "title": "Lamp", "unitPrice": "30", "quantity": -1},
            {"productId": "P3", "unitPrice": "10", "quantity": 1},
            {"productId": "P4", "title": "Kettle", "unitPrice": "oops", "quantity": 1},
            "not a line",
            {"productId": "P5", "title": "Rug", "unitPrice": "80", "quantity": 1}
        ]"#;
        let state = CartState::from_persisted_json(json).unwrap();

        let order: Vec<_> = state.lines().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, ["P1", "P5"]);
        assert_eq!(state.get(&ProductId::new("P1")).unwrap().quantity, 2);
        assert_eq!(state.total_amount(), dec("180"));
    }

    #[test]
    fn test_persisted_blank_ids_are_dropped_after_trimming() {
        let json = r#"[
            {"productId": "   ", "title": "Blank", "unitPrice": "5", "quantity": 1},
            {"productId": " P1 ", "title": "Fan", "unitPrice": "5", "quantity": 1}
        ]"#;
        let state = CartState::from_persisted_json(json).unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.contains(&ProductId::new("P1")));
    }

    #[test]
    fn test_persisted_wrong_shape_is_error() {
        assert!(CartState::from_persisted_json("{}").is_err());
        assert!(CartState::from_persisted_json("garbage").is_err());
    }

    #[test]
    fn test_vat_breakdown() {
        let totals = CartTotals {
            item_count: 3,
            total_amount: dec("130"),
        };
        let vat = totals.vat(dec("0.05"));
        assert_eq!(vat.subtotal, dec("130"));
        assert_eq!(vat.vat, dec("6.50"));
        assert_eq!(vat.total, dec("136.50"));
    }
}
