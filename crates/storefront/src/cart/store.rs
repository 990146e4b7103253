//! The cart store: owner of the cart state.

use chrono::Utc;
use indexmap::map::Entry;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use souq_core::{CurrencyCode, Locale, ProductId};

use crate::catalog::CatalogLookup;

use super::message::render_order_message;
use super::state::{CartLine, CartState, CartTotals, VatBreakdown};
use super::storage::{CartStorage, StorageError};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "emirates_cart";

/// Per-store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Key the serialized cart is stored under.
    pub storage_key: String,
    /// Currency shown in the order message.
    pub currency: CurrencyCode,
    /// Language of the order message.
    pub locale: Locale,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: CurrencyCode::default(),
            locale: Locale::default(),
        }
    }
}

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added,
    /// An existing line's quantity was bumped.
    Incremented { quantity: u32 },
    /// The catalog does not know the product; the cart is unchanged.
    NotFound,
}

impl AddOutcome {
    #[must_use]
    pub const fn is_not_found(self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Owns the cart and keeps its persisted mirror up to date.
///
/// Mutations take `&mut self`; callers that share a store across threads
/// must wrap it in a lock so mutations stay serialized.
#[derive(Debug)]
pub struct CartStore<S> {
    state: CartState,
    storage: S,
    settings: CartSettings,
    saved: bool,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, hydrating state from `storage`.
    ///
    /// Missing or unreadable state yields an empty cart.
    pub fn open(storage: S, settings: CartSettings) -> Self {
        let state = read_state(&storage, &settings.storage_key);
        info!(
            lines = state.len(),
            items = state.item_count(),
            storage_key = %settings.storage_key,
            "Cart loaded"
        );
        Self {
            state,
            storage,
            settings,
            saved: true,
        }
    }

    /// Read the persisted cart from storage without touching the in-memory
    /// state.
    #[must_use]
    pub fn load(&self) -> CartState {
        read_state(&self.storage, &self.settings.storage_key)
    }

    /// Add one unit of `id`, resolving it through `catalog`.
    ///
    /// A new line captures the product's title, unit price, and image as
    /// they are right now. An unknown product leaves the cart untouched and
    /// returns [`AddOutcome::NotFound`].
    pub fn add_item<L>(&mut self, id: &ProductId, catalog: &L) -> AddOutcome
    where
        L: CatalogLookup + ?Sized,
    {
        let Some(record) = catalog.lookup(id) else {
            warn!(product_id = %id, "Product not found, cart unchanged");
            return AddOutcome::NotFound;
        };

        let outcome = match self.state.lines_mut().entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                let line = entry.get_mut();
                line.quantity = line.quantity.saturating_add(1);
                AddOutcome::Incremented {
                    quantity: line.quantity,
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(CartLine::from_record(&record, Utc::now()));
                AddOutcome::Added
            }
        };

        debug!(product_id = %id, ?outcome, "Added to cart");
        self.persist();
        outcome
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let removed = self.state.lines_mut().shift_remove(id).is_some();
        if removed {
            debug!(product_id = %id, "Removed from cart");
        }
        self.persist();
        removed
    }

    /// Set the quantity of an existing line.
    ///
    /// Zero or below removes the line. There is no upper bound beyond
    /// `u32::MAX`, which larger values saturate to. Returns whether a line
    /// was changed or removed.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let updated = match self.state.lines_mut().get_mut(id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        };
        if updated {
            debug!(product_id = %id, quantity, "Updated cart quantity");
        }
        self.persist();
        updated
    }

    /// Bump an existing line by one, saturating at `u32::MAX`. Returns
    /// whether the cart had a line for `id`.
    pub fn increment(&mut self, id: &ProductId) -> bool {
        match self.state.get(id).map(|line| line.quantity) {
            Some(quantity) => self.set_quantity(id, i64::from(quantity) + 1),
            None => false,
        }
    }

    /// Lower an existing line by one; a line at quantity 1 is removed.
    /// Returns whether the cart had a line for `id`.
    pub fn decrement(&mut self, id: &ProductId) -> bool {
        match self.state.get(id).map(|line| line.quantity) {
            Some(quantity) => self.set_quantity(id, i64::from(quantity) - 1),
            None => false,
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.state.lines_mut().clear();
        debug!("Cart cleared");
        self.persist();
    }

    /// Item count and rounded total.
    #[must_use]
    pub fn aggregates(&self) -> CartTotals {
        self.state.totals()
    }

    /// Totals with VAT at `rate` applied.
    #[must_use]
    pub fn vat_breakdown(&self, rate: Decimal) -> VatBreakdown {
        self.aggregates().vat(rate)
    }

    /// The order summary for the WhatsApp hand-off.
    #[must_use]
    pub fn render_order_message(&self) -> String {
        render_order_message(&self.state, self.settings.locale, self.settings.currency)
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.state.lines()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    #[must_use]
    pub const fn settings(&self) -> &CartSettings {
        &self.settings
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Whether the last write reached storage.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.saved
    }

    /// Make sure the current state is in storage, writing it again if the
    /// last write failed. For front ends that exit right after a mutation.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails again.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.saved {
            self.write_state()?;
            self.saved = true;
        }
        Ok(())
    }

    /// Best-effort write of the current state. Failures are logged and the
    /// in-memory state stays authoritative.
    fn persist(&mut self) {
        match self.write_state() {
            Ok(()) => self.saved = true,
            Err(e) => {
                self.saved = false;
                warn!(
                    error = %e,
                    storage_key = %self.settings.storage_key,
                    "Failed to persist cart, keeping in-memory state"
                );
            }
        }
    }

    fn write_state(&mut self) -> Result<(), StorageError> {
        let json = self.state.to_persisted_json()?;
        self.storage.write(&self.settings.storage_key, &json)
    }
}

fn read_state<S: CartStorage>(storage: &S, key: &str) -> CartState {
    match storage.read(key) {
        Ok(Some(raw)) => CartState::from_persisted_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, storage_key = %key, "Persisted cart is corrupt, starting empty");
            CartState::new()
        }),
        Ok(None) => CartState::new(),
        Err(e) => {
            warn!(error = %e, storage_key = %key, "Failed to read persisted cart, starting empty");
            CartState::new()
        }
    }
}
