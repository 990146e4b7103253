//! Core types for Emirates Souq.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod locale;
pub mod phone;
pub mod price;

pub use id::ProductId;
pub use locale::{Locale, LocaleError};
pub use phone::{WhatsAppNumber, WhatsAppNumberError};
pub use price::{CurrencyCode, CurrencyCodeError, Price};
