//! Cart state and mutation rules.
//!
//! A [`Cart`] keeps at most one [`CartLine`] per item, in the order items were
//! first added. Quantities are never zero: a line whose quantity would drop to
//! zero is removed. Totals are always recomputed from the lines.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::{ItemId, Price};

/// One item's entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog item identifier.
    pub item_id: ItemId,
    /// Display name at the time the item was added.
    pub name: String,
    /// Unit price at the time the item was added.
    pub unit_price: Price,
    /// Image URL or path.
    pub image_url: String,
    /// Number of units, at least one.
    pub quantity: NonZeroU32,
}

impl CartLine {
    fn from_item(item: &CatalogItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            image_url: item.image_url.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity.get())
    }
}

/// A mutation to apply to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Add one unit of a catalog item.
    Add(CatalogItem),
    /// Set an existing line's quantity; zero or less removes the line.
    SetQuantity {
        /// Line to change.
        item_id: ItemId,
        /// New quantity.
        quantity: i64,
    },
    /// Remove every line.
    Clear,
}

/// The user's current, unsubmitted selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in first-added order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for an item, if present.
    #[must_use]
    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id == *item_id)
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line for the item, or appends a new line with
    /// quantity one.
    pub fn add(&mut self, item: &CatalogItem) {
        match self.lines.iter_mut().find(|line| line.item_id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::from_item(item)),
        }
    }

    /// Set the quantity of the line for `item_id`.
    ///
    /// A quantity of zero or less removes the line. Unknown ids are ignored;
    /// this never creates a line. Quantities above `u32::MAX` are clamped.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: i64) {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        match NonZeroU32::new(clamped) {
            None => self.lines.retain(|line| line.item_id != *item_id),
            Some(quantity) => {
                if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == *item_id) {
                    line.quantity = quantity;
                }
            }
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Apply a command to this snapshot and return the next snapshot.
    #[must_use]
    pub fn apply(mut self, command: &CartCommand) -> Self {
        self.execute(command);
        self
    }

    /// Apply a command in place.
    pub fn execute(&mut self, command: &CartCommand) {
        match command {
            CartCommand::Add(item) => self.add(item),
            CartCommand::SetQuantity { item_id, quantity } => {
                self.set_quantity(item_id, *quantity);
            }
            CartCommand::Clear => self.clear(),
        }
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
