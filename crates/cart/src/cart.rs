//! Cart data model.
//!
//! A cart is an ordered sequence of [`LineItem`]s, one per product, in
//! insertion order of first add. Product attributes are denormalized onto the
//! line at add-time so the cart renders without further catalog lookups.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marmalade_core::ProductId;

use crate::stock::ProductRecord;

/// One product's entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier; unique within a cart.
    pub id: ProductId,
    /// Product title as served by the catalog at add-time.
    pub title: String,
    /// Unit price at add-time.
    pub price: Decimal,
    /// Product image URL, if the catalog has one.
    pub image: Option<String>,
    /// Quantity in the cart; always at least 1.
    pub amount: u32,
}

impl LineItem {
    /// Line total: unit price times amount.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

impl From<ProductRecord> for LineItem {
    /// Denormalize a catalog record into a fresh line with amount 1.
    fn from(product: ProductRecord) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }
}

/// Read snapshot of the cart.
///
/// Owned copy of the store's state at the time of the call; mutating it has
/// no effect on the store. All changes go through the store's operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    /// Line items in insertion order of first add.
    pub lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id == product_id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(LineItem::line_total)
            .sum::<Decimal>()
    }
}
