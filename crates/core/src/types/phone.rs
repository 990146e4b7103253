//! WhatsApp phone number type.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`WhatsAppNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WhatsAppNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Digits found.
        got: usize,
    },
}

/// An international phone number in the digits-only form `wa.me` links use.
///
/// ## Constraints
///
/// - A leading `+`, spaces, and dashes are accepted and stripped
/// - What remains must be 8-15 ASCII digits (E.164 allows at most 15)
///
/// ## Examples
///
/// ```
/// use souq_core::WhatsAppNumber;
///
/// let number = WhatsAppNumber::parse("+971 50-123-4567").unwrap();
/// assert_eq!(number.as_str(), "971501234567");
///
/// assert!(WhatsAppNumber::parse("").is_err());
/// assert!(WhatsAppNumber::parse("12ab").is_err());
/// assert!(WhatsAppNumber::parse("123").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WhatsAppNumber(String);

impl WhatsAppNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `WhatsAppNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits, `+`, spaces or dashes, or has the wrong number of digits.
    pub fn parse(s: &str) -> Result<Self, WhatsAppNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(WhatsAppNumberError::Empty);
        }

        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                other => return Err(WhatsAppNumberError::InvalidCharacter(other)),
            }
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(WhatsAppNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WhatsAppNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

impl FromStr for WhatsAppNumber {
    type Err = WhatsAppNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WhatsAppNumber {
    type Error = WhatsAppNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WhatsAppNumber> for String {
    fn from(number: WhatsAppNumber) -> Self {
        number.0
    }
}
