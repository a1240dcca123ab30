//! Cart state container.
//!
//! [`CartStore`] owns the in-memory cart, validates every mutation against
//! the stock service, and mirrors each successful mutation into persistent
//! storage as one serialized line-item array under a fixed key. The cart is
//! hydrated from that key once, at construction.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{instrument, warn};

use marmalade_core::ProductId;

use crate::cart::{Cart, LineItem};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::notify::{LogNotifier, Notifier};
use crate::stock::{HttpStockClient, StockService};
use crate::storage::{CartStorage, JsonFileStore, StorageError};

// User-facing copy for notification messages.
const MSG_OUT_OF_STOCK: &str = "Requested quantity is out of stock";
const MSG_ADD_FAILED: &str = "Couldn't add the product to the cart";
const MSG_NOT_IN_CART: &str = "The product is not in the cart";
const MSG_INVALID_AMOUNT: &str = "Quantity must be at least 1";
const MSG_RESTORE_FAILED: &str = "Couldn't restore the saved cart";

/// Shopping cart state container.
///
/// Cheaply cloneable handle; all clones share one cart. Mutations serialize
/// through an internal lock held across the stock lookups, so overlapping
/// calls cannot interleave their read-validate-write cycles.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    stock: Arc<dyn StockService>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    storage_key: String,
    lines: Mutex<Vec<LineItem>>,
}

impl CartStore {
    /// Open a store over the given collaborators, hydrating the cart from
    /// the blob persisted under `storage_key`.
    ///
    /// A missing blob yields an empty cart. An unparsable blob also yields
    /// an empty cart, with a warning logged and an error notification
    /// emitted.
    pub async fn open(
        stock: Arc<dyn StockService>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let lines = hydrate(storage.as_ref(), notifier.as_ref(), &storage_key).await;

        Self {
            inner: Arc::new(CartStoreInner {
                stock,
                storage,
                notifier,
                storage_key,
                lines: Mutex::new(lines),
            }),
        }
    }

    /// Open a store wired to the production collaborators described by
    /// `config`: HTTP stock client, JSON file storage, tracing notifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage file cannot be opened.
    pub async fn from_config(config: &CartConfig) -> Result<Self, StorageError> {
        let stock = Arc::new(HttpStockClient::new(&config.stock));
        let storage = Arc::new(JsonFileStore::open(&config.storage_path).await?);

        Ok(Self::open(
            stock,
            storage,
            Arc::new(LogNotifier),
            config.storage_key.clone(),
        )
        .await)
    }

    /// Current cart contents as an owned snapshot.
    pub async fn cart(&self) -> Cart {
        let lines = self.inner.lines.lock().await;
        Cart {
            lines: lines.clone(),
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// Increments the existing line if the product is already present,
    /// otherwise fetches the product metadata and appends a new line with
    /// amount 1. The resulting cart is persisted before returning.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the in-cart amount has reached the
    ///   available stock; the cart is left unchanged.
    /// - [`CartError::Lookup`] if a stock or catalog lookup fails.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut lines = self.inner.lines.lock().await;

        let current = lines
            .iter()
            .find(|line| line.id == product_id)
            .map_or(0, |line| line.amount);

        let stock = match self.inner.stock.get_stock(product_id).await {
            Ok(stock) => stock,
            Err(e) => return Err(self.fail(MSG_ADD_FAILED, CartError::Lookup(e))),
        };

        if current >= stock.amount {
            return Err(self.fail(MSG_OUT_OF_STOCK, CartError::OutOfStock));
        }

        let title = if let Some(line) = lines.iter_mut().find(|line| line.id == product_id) {
            line.amount += 1;
            line.title.clone()
        } else {
            let product = match self.inner.stock.get_product(product_id).await {
                Ok(product) => product,
                Err(e) => return Err(self.fail(MSG_ADD_FAILED, CartError::Lookup(e))),
            };
            let title = product.title.clone();
            lines.push(LineItem::from(product));
            title
        };

        self.persist(&lines).await;
        self.inner.notifier.info(&format!("{title} added to cart"));
        Ok(())
    }

    /// Remove a product's line from the cart entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product has no line; the
    /// cart is left unchanged and nothing is written.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut lines = self.inner.lines.lock().await;

        let Some(index) = lines.iter().position(|line| line.id == product_id) else {
            return Err(self.fail(MSG_NOT_IN_CART, CartError::ItemNotFound(product_id)));
        };

        let removed = lines.remove(index);
        self.persist(&lines).await;
        self.inner
            .notifier
            .info(&format!("{} removed from cart", removed.title));
        Ok(())
    }

    /// Set the absolute amount of a product already in the cart.
    ///
    /// Validation order: amount below 1, then stock, then line existence.
    /// A failing stock lookup is reported as [`CartError::OutOfStock`].
    /// Either the line's amount is replaced and the cart persisted, or
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidAmount`] if `amount` is below 1.
    /// - [`CartError::OutOfStock`] if `amount` exceeds the fresh stock
    ///   level, or the level cannot be fetched.
    /// - [`CartError::ItemNotFound`] if the product has no line.
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<(), CartError> {
        if amount < 1 {
            return Err(self.fail(MSG_INVALID_AMOUNT, CartError::InvalidAmount(amount)));
        }

        let mut lines = self.inner.lines.lock().await;

        match self.inner.stock.get_stock(product_id).await {
            Ok(stock) if amount <= stock.amount => {}
            Ok(_) | Err(_) => {
                return Err(self.fail(MSG_OUT_OF_STOCK, CartError::OutOfStock));
            }
        }

        let Some(line) = lines.iter_mut().find(|line| line.id == product_id) else {
            return Err(self.fail(MSG_NOT_IN_CART, CartError::ItemNotFound(product_id)));
        };

        line.amount = amount;
        let title = line.title.clone();
        self.persist(&lines).await;
        self.inner
            .notifier
            .info(&format!("{title} set to {amount} in cart"));
        Ok(())
    }

    /// Report a failed branch: notify the user, pass the error through.
    fn fail(&self, message: &str, err: CartError) -> CartError {
        self.inner.notifier.error(message);
        err
    }

    /// Rewrite the whole cart into the storage slot.
    ///
    /// Fire-and-forget: a failed write is logged and the in-memory state
    /// stands; the next successful mutation rewrites the full cart anyway.
    async fn persist(&self, lines: &[LineItem]) {
        let blob = match serde_json::to_string(lines) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.inner.storage.write(&self.inner.storage_key, &blob).await {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Load the persisted line-item array, degrading to an empty cart.
async fn hydrate(storage: &dyn CartStorage, notifier: &dyn Notifier, key: &str) -> Vec<LineItem> {
    match storage.read(key).await {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(key, error = %e, "Persisted cart is unreadable, starting empty");
                notifier.error(MSG_RESTORE_FAILED);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted cart, starting empty");
            notifier.error(MSG_RESTORE_FAILED);
            Vec::new()
        }
    }
}
