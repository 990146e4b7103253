//! Type-safe price representation using decimal arithmetic.
//!
//! All money in the storefront is a [`Decimal`]; floating point never
//! touches an amount. Display rounding is half-away-from-zero to two decimal
//! places, which is what shoppers expect to see on a receipt.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::locale::Locale;

/// Number of decimal places shown for money amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round an amount to two decimal places, half away from zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use souq_core::price::round_money;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dirhams, not fils).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// The amount rounded for display.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        round_money(self.amount)
    }

    /// Format with an Arabic currency label (e.g., "50.00 درهم").
    #[must_use]
    pub fn display_arabic(&self) -> String {
        format!("{:.2} {}", self.rounded(), self.currency_code.arabic_label())
    }

    /// Format for a shopper reading `locale`.
    #[must_use]
    pub fn display_for(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.to_string(),
            Locale::Ar => self.display_arabic(),
        }
    }
}

impl fmt::Display for Price {
    /// Format for display (e.g., "50.00 AED").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.rounded(), self.currency_code.code())
    }
}

/// Error returned when a currency code is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    AED,
    SAR,
    EGP,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AED => "AED",
            Self::SAR => "SAR",
            Self::EGP => "EGP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }

    /// The label used in Arabic order messages.
    #[must_use]
    pub const fn arabic_label(self) -> &'static str {
        match self {
            Self::AED => "درهم",
            Self::SAR => "ريال",
            Self::EGP => "جنيه",
            Self::USD => "دولار",
            Self::EUR => "يورو",
            Self::GBP => "جنيه إسترليني",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AED" => Ok(Self::AED),
            "SAR" => Ok(Self::SAR),
            "EGP" => Ok(Self::EGP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(CurrencyCodeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
        assert_eq!(round_money(Decimal::new(1_004, 3)), Decimal::new(100, 2));
        assert_eq!(round_money(Decimal::new(25, 3)), Decimal::new(3, 2));
    }

    #[test]
    fn test_price_display_pads_decimals() {
        let price = Price::new(Decimal::from(130), CurrencyCode::AED);
        assert_eq!(price.to_string(), "130.00 AED");
        assert_eq!(price.display_arabic(), "130.00 درهم");
    }

    #[test]
    fn test_display_for_locale() {
        let price = Price::new(Decimal::new(49_995, 3), CurrencyCode::SAR);
        assert_eq!(price.display_for(Locale::En), "50.00 SAR");
        assert_eq!(price.display_for(Locale::Ar), price.display_arabic());
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("aed".parse::<CurrencyCode>().unwrap(), CurrencyCode::AED);
        assert_eq!(" usd ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_default_currency_is_dirham() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::AED);
    }
}
