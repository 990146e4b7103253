//! Emirates Souq Core - Shared types library.
//!
//! This crate provides common types used across all storefront components:
//! - `storefront` - Catalog ingestion, cart store, and checkout hand-off
//! - `cli` - Command-line front end driving the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, phone numbers, and locales

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
