//! Emirates Souq Storefront library.
//!
//! The storefront is a static catalog plus a shopper-local cart that hands
//! orders off to WhatsApp. This crate holds everything that is not markup:
//!
//! - [`catalog`] - Product records, JSON ingestion and validation, async loading
//! - [`cart`] - The cart store, its durable storage, totals, and the order message
//! - [`checkout`] - WhatsApp deep links built from the order message
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Unified error type for front ends

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;

pub use cart::{AddOutcome, CartLine, CartSettings, CartState, CartStore, CartTotals};
pub use catalog::{Catalog, CatalogHandle, CatalogLookup, ProductRecord};
