//! Session cart store.
//!
//! [`CartStore`] is the only writer of the cart during a request. It
//! rehydrates the [`Cart`] from its [`CartStorage`] slot, applies one of the
//! four mutations, and writes the full list back.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut store = CartStore::load(SessionCartStorage::new(session), delivery_charge).await?;
//! store.add_item(item).await?;
//! let snapshot = store.snapshot();
//! ```

mod storage;

pub use storage::{CartStorage, CartStorageError, MemoryCartStorage, SessionCartStorage};

use fashionable_queen_core::{Cart, CartSnapshot, LineItem, LineKey};
use rust_decimal::Decimal;
use tracing::instrument;

/// Sole mutator of one session's cart.
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
    delivery_charge: Decimal,
}

impl<S: CartStorage> CartStore<S> {
    /// Rehydrate the cart from `storage`.
    ///
    /// An empty slot yields an empty cart. A slot that no longer decodes as a
    /// list of line items is logged and treated as empty; it is overwritten
    /// on the next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub async fn load(storage: S, delivery_charge: Decimal) -> Result<Self, CartStorageError> {
        let cart = match storage.read().await? {
            None => Cart::new(),
            Some(raw) => serde_json::from_value::<Cart>(raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable cart record");
                Cart::new()
            }),
        };

        Ok(Self {
            cart,
            storage,
            delivery_charge,
        })
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines plus derived totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot(self.delivery_charge)
    }

    /// Merge `item` into the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_item(&mut self, item: LineItem) -> Result<(), CartStorageError> {
        self.cart.add_item(item);
        self.persist().await
    }

    /// Set the quantity of a line to `max(1, quantity)` and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &mut self,
        key: LineKey<'_>,
        quantity: i64,
    ) -> Result<(), CartStorageError> {
        if !self.cart.update_quantity(&key, quantity) {
            tracing::debug!("No cart line to update");
        }
        self.persist().await
    }

    /// Remove a line and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, key: LineKey<'_>) -> Result<(), CartStorageError> {
        if !self.cart.remove_item(&key) {
            tracing::debug!("No cart line to remove");
        }
        self.persist().await
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartStorageError> {
        self.cart.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<(), CartStorageError> {
        self.storage.write(&self.cart).await
    }
}
