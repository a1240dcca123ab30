//! Cart operation errors.

use thiserror::Error;

use marmalade_core::ProductId;

use crate::stock::StockError;

/// Errors returned by cart mutations.
///
/// Every failing operation also reports through the store's
/// [`Notifier`](crate::notify::Notifier), so callers can branch on the error
/// kind without scraping message text.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested or resulting amount exceeds the available stock.
    #[error("requested amount is out of stock")]
    OutOfStock,

    /// The mutation targets a product that is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// Requested amount is below the minimum of 1.
    #[error("invalid amount: {0}")]
    InvalidAmount(u32),

    /// A stock or catalog lookup failed.
    #[error("stock lookup failed: {0}")]
    Lookup(#[from] StockError),
}
