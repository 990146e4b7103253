//! Shopper-local cart.
//!
//! The cart lives entirely on the shopper's side: a [`CartStore`] owns the
//! in-memory [`CartState`], mirrors it to a [`CartStorage`] backend after
//! every mutation, and renders the order message handed to WhatsApp.
//!
//! # Invariants
//!
//! - Every line has `quantity >= 1`; setting a quantity to zero or below
//!   removes the line.
//! - At most one line per product; adding a product again bumps its quantity.
//! - Title, unit price, and image are captured when the line is created and
//!   never re-read from the catalog.
//!
//! # Failure model
//!
//! Cart operations never return errors. Unreadable persisted state loads as
//! an empty cart, failed writes are logged and the in-memory state stays
//! authoritative, and an unknown product is reported through
//! [`AddOutcome::NotFound`].

mod message;
mod state;
mod storage;
mod store;

pub use message::render_order_message;
pub use state::{CartLine, CartState, CartTotals, VatBreakdown};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{AddOutcome, CartSettings, CartStore, DEFAULT_STORAGE_KEY};
