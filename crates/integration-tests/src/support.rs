//! Shared fixtures: a cart store wired to fresh mock collaborators.

use std::sync::Arc;

use rust_decimal::Decimal;

use marmalade_cart::{CartStore, LineItem};
use marmalade_cart::notify::mock::RecordingNotifier;
use marmalade_cart::stock::ProductRecord;
use marmalade_cart::stock::mock::MockStockService;
use marmalade_cart::storage::memory::MemoryStore;
use marmalade_core::ProductId;

/// Storage slot used by every test cart.
pub const CART_KEY: &str = "marmalade:cart";

/// Build a catalog record with a price in cents.
#[must_use]
pub fn product(id: i32, title: &str, cents: i64) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        image: Some(format!("https://cdn.marmalade.shop/products/{id}.jpg")),
    }
}

/// A cart store plus handles to the mocks behind it.
pub struct TestCart {
    pub store: CartStore,
    pub stock: Arc<MockStockService>,
    pub storage: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestCart {
    /// Open a store over fresh mocks, stocking each `(product, amount)`.
    pub async fn with_stock(items: Vec<(ProductRecord, u32)>) -> Self {
        let stock = Arc::new(MockStockService::new());
        for (record, amount) in items {
            stock.insert(record, amount);
        }
        Self::over(stock, Arc::new(MemoryStore::new())).await
    }

    /// Open a store over the given stock mock and storage, recording
    /// notifications.
    pub async fn over(stock: Arc<MockStockService>, storage: Arc<MemoryStore>) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let store = CartStore::open(
            stock.clone(),
            storage.clone(),
            notifier.clone(),
            CART_KEY,
        )
        .await;

        Self {
            store,
            stock,
            storage,
            notifier,
        }
    }

    /// The `(product_id, amount)` pairs currently persisted under the cart
    /// key, or `None` if nothing was written yet.
    #[must_use]
    pub fn persisted(&self) -> Option<Vec<(i32, u32)>> {
        let blob = self.storage.get(CART_KEY)?;
        let lines: Vec<LineItem> =
            serde_json::from_str(&blob).expect("persisted blob parses as a line array");
        Some(
            lines
                .iter()
                .map(|line| (line.id.as_i32(), line.amount))
                .collect(),
        )
    }
}
