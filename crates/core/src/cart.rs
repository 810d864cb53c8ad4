//! Shopping cart bookkeeping.
//!
//! [`Cart`] is a plain reducer over an ordered list of [`LineItem`]s. It has
//! no I/O of its own; the storefront wraps it in a store that persists the
//! list after every mutation.
//!
//! # Invariants
//!
//! - At most one line exists per identity key
//!   (`product_id`, `selected_size`, `selected_color`).
//! - Lines keep their insertion order.
//! - [`Cart::update_quantity`] never stores a quantity below 1.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// One purchasable configuration of a product in the cart.
///
/// Name, price and image are snapshotted when the line is added and are not
/// re-synced if the catalog entry changes later.
///
/// The serialized field names are the persisted storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub selected_size: String,
    #[serde(default)]
    pub selected_color: String,
}

impl LineItem {
    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: self.product_id.as_str(),
            selected_size: &self.selected_size,
            selected_color: &self.selected_color,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Identity key of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a str,
    pub selected_size: &'a str,
    pub selected_color: &'a str,
}

impl<'a> LineKey<'a> {
    #[must_use]
    pub const fn new(product_id: &'a str, selected_size: &'a str, selected_color: &'a str) -> Self {
        Self {
            product_id,
            selected_size,
            selected_color,
        }
    }
}

/// The ordered collection of line items for one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from a persisted list, as-is.
    #[must_use]
    pub const fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find a line by identity key.
    #[must_use]
    pub fn get(&self, key: &LineKey<'_>) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key() == *key)
    }

    /// Merge `item` into the cart.
    ///
    /// When a line with the same identity key exists its quantity grows by
    /// `item.quantity`; otherwise `item` is appended. The incoming quantity
    /// is taken as given.
    pub fn add_item(&mut self, item: LineItem) {
        if let Some(existing) = self.items.iter_mut().find(|line| line.key() == item.key()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Set the quantity of the matching line to `max(1, quantity)`.
    ///
    /// Returns `false` (and changes nothing) when no line matches.
    pub fn update_quantity(&mut self, key: &LineKey<'_>, quantity: i64) -> bool {
        let Some(line) = self.items.iter_mut().find(|line| line.key() == *key) else {
            return false;
        };
        line.quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
        true
    }

    /// Remove the matching line, if any. Returns whether a line was removed.
    pub fn remove_item(&mut self, key: &LineKey<'_>) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.key() != *key);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Read-only view with derived aggregates.
    #[must_use]
    pub fn snapshot(&self, delivery_charge: Decimal) -> CartSnapshot {
        let subtotal = self.subtotal();
        CartSnapshot {
            items: self.items.clone(),
            count: self.count(),
            subtotal,
            delivery_charge,
            grand_total: subtotal + delivery_charge,
        }
    }
}

/// Cart lines plus aggregates, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub count: u64,
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub grand_total: Decimal,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
