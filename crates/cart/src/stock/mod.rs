//! Stock service collaborator.
//!
//! The stock API is the authority on how many units of a product can be sold
//! and on product metadata. The cart only reads from it; stock levels are
//! mutated elsewhere.
//!
//! [`StockService`] is the seam the store depends on; [`HttpStockClient`] is
//! the production implementation and [`mock::MockStockService`] the test
//! double.

mod http;

pub use http::HttpStockClient;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marmalade_core::ProductId;

/// Errors that can occur when talking to the stock API.
#[derive(Debug, Error)]
pub enum StockError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("stock API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The product is unknown to the stock API.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Rate limited by the stock API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Remotely tracked available quantity for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: ProductId,
    /// Units available for sale; the ceiling for any cart line's amount.
    pub amount: u32,
}

/// Product metadata as served by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// Read-only view of the stock API.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Current stock level for a product.
    ///
    /// # Errors
    ///
    /// Fails if the product is unknown or the API is unreachable.
    async fn get_stock(&self, product_id: ProductId) -> Result<StockLevel, StockError>;

    /// Product metadata for a product.
    ///
    /// # Errors
    ///
    /// Fails if the product is unknown or the API is unreachable.
    async fn get_product(&self, product_id: ProductId) -> Result<ProductRecord, StockError>;
}

/// In-memory stock service for tests and doc examples.
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{ProductRecord, StockError, StockLevel, StockService};

    use marmalade_core::ProductId;

    /// Stock service over a mutex-guarded table, with failure injection,
    /// per-call latency, and call counters.
    #[derive(Default)]
    pub struct MockStockService {
        records: Mutex<HashMap<ProductId, (ProductRecord, u32)>>,
        unreachable: AtomicBool,
        latency_ms: AtomicU64,
        stock_calls: AtomicUsize,
        product_calls: AtomicUsize,
    }

    impl MockStockService {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Stock `amount` units of `product`.
        pub fn insert(&self, product: ProductRecord, amount: u32) {
            self.records
                .lock()
                .expect("stock table lock poisoned")
                .insert(product.id, (product, amount));
        }

        /// Change the available amount of an already-stocked product.
        pub fn set_amount(&self, product_id: ProductId, amount: u32) {
            if let Some(entry) = self
                .records
                .lock()
                .expect("stock table lock poisoned")
                .get_mut(&product_id)
            {
                entry.1 = amount;
            }
        }

        /// Make every call fail as if the API were down.
        pub fn set_unreachable(&self, unreachable: bool) {
            self.unreachable.store(unreachable, Ordering::SeqCst);
        }

        /// Delay every call by `millis`, to widen race windows in tests.
        pub fn set_latency_ms(&self, millis: u64) {
            self.latency_ms.store(millis, Ordering::SeqCst);
        }

        /// Number of `get_stock` calls so far.
        #[must_use]
        pub fn stock_calls(&self) -> usize {
            self.stock_calls.load(Ordering::SeqCst)
        }

        /// Number of `get_product` calls so far.
        #[must_use]
        pub fn product_calls(&self) -> usize {
            self.product_calls.load(Ordering::SeqCst)
        }

        async fn simulate_call(&self) -> Result<(), StockError> {
            let millis = self.latency_ms.load(Ordering::SeqCst);
            if millis > 0 {
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(StockError::Api {
                    status: 503,
                    body: "service unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StockService for MockStockService {
        async fn get_stock(&self, product_id: ProductId) -> Result<StockLevel, StockError> {
            self.stock_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_call().await?;
            let records = self.records.lock().expect("stock table lock poisoned");
            records.get(&product_id).map_or(
                Err(StockError::NotFound(product_id)),
                |(_, amount)| {
                    Ok(StockLevel {
                        id: product_id,
                        amount: *amount,
                    })
                },
            )
        }

        async fn get_product(&self, product_id: ProductId) -> Result<ProductRecord, StockError> {
            self.product_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_call().await?;
            let records = self.records.lock().expect("stock table lock poisoned");
            records
                .get(&product_id)
                .map(|(product, _)| product.clone())
                .ok_or(StockError::NotFound(product_id))
        }
    }
}
