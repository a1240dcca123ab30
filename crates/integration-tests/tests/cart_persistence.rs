//! Integration tests for cart persistence: hydration, round-trips, and
//! degraded storage.

use std::sync::Arc;

use marmalade_cart::CartStore;
use marmalade_cart::notify::mock::RecordingNotifier;
use marmalade_cart::stock::mock::MockStockService;
use marmalade_cart::storage::memory::MemoryStore;
use marmalade_cart::storage::JsonFileStore;
use marmalade_core::ProductId;

use marmalade_integration_tests::support::{CART_KEY, TestCart, product};

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test]
async fn blob_round_trip_preserves_line_order() {
    let cart = TestCart::with_stock(vec![
        (product(3, "Trail Runner", 17990), 5),
        (product(1, "Court Classic", 9990), 5),
        (product(2, "High Top", 12990), 5),
    ])
    .await;

    for id in [3, 1, 2] {
        cart.store.add_product(ProductId::new(id)).await.expect("in stock");
    }
    cart.store
        .update_product_amount(ProductId::new(1), 4)
        .await
        .expect("in stock");

    // a second session over the same storage sees the same cart
    let rehydrated = TestCart::over(cart.stock.clone(), cart.storage.clone()).await;
    let snapshot = rehydrated.store.cart().await;

    let lines: Vec<(i32, u32)> = snapshot
        .lines
        .iter()
        .map(|line| (line.id.as_i32(), line.amount))
        .collect();
    assert_eq!(lines, vec![(3, 1), (1, 4), (2, 1)]);
    assert!(rehydrated.notifier.messages().is_empty());
}

#[tokio::test]
async fn missing_blob_hydrates_an_empty_cart_silently() {
    let cart = TestCart::with_stock(vec![]).await;

    assert!(cart.store.cart().await.is_empty());
    assert!(cart.notifier.messages().is_empty());
}

#[tokio::test]
async fn unparsable_blob_hydrates_empty_and_notifies() {
    let storage = Arc::new(MemoryStore::new());
    storage.seed(CART_KEY, "{definitely not a line array");

    let cart = TestCart::over(Arc::new(MockStockService::new()), storage).await;

    assert!(cart.store.cart().await.is_empty());
    assert_eq!(
        cart.notifier.errors(),
        vec!["Couldn't restore the saved cart"]
    );
}

#[tokio::test]
async fn wrong_shape_blob_hydrates_empty_and_notifies() {
    let storage = Arc::new(MemoryStore::new());
    storage.seed(CART_KEY, r#"{"lines": []}"#);

    let cart = TestCart::over(Arc::new(MockStockService::new()), storage).await;

    assert!(cart.store.cart().await.is_empty());
    assert_eq!(cart.notifier.errors().len(), 1);
}

// =============================================================================
// Degraded storage
// =============================================================================

#[tokio::test]
async fn write_failure_keeps_the_in_memory_cart_usable() {
    let cart = TestCart::with_stock(vec![(product(1, "Court Classic", 9990), 5)]).await;
    cart.storage.fail_writes(true);

    cart.store
        .add_product(ProductId::new(1))
        .await
        .expect("mutation succeeds; the write is fire-and-forget");

    let snapshot = cart.store.cart().await;
    assert_eq!(snapshot.line(ProductId::new(1)).map(|l| l.amount), Some(1));
    assert_eq!(cart.persisted(), None);

    // the next successful mutation rewrites the full cart
    cart.storage.fail_writes(false);
    cart.store.add_product(ProductId::new(1)).await.expect("in stock");
    assert_eq!(cart.persisted(), Some(vec![(1, 2)]));
}

// =============================================================================
// File-backed storage end to end
// =============================================================================

#[tokio::test]
async fn cart_survives_a_restart_on_file_storage() {
    let path = std::env::temp_dir().join(format!("cart_it_{}.json", uuid::Uuid::new_v4()));

    let stock = Arc::new(MockStockService::new());
    stock.insert(product(1, "Court Classic", 9990), 5);
    stock.insert(product(2, "High Top", 12990), 5);

    {
        let storage = Arc::new(JsonFileStore::open(&path).await.expect("open storage"));
        let store = CartStore::open(
            stock.clone(),
            storage,
            Arc::new(RecordingNotifier::new()),
            CART_KEY,
        )
        .await;

        store.add_product(ProductId::new(1)).await.expect("in stock");
        store.add_product(ProductId::new(2)).await.expect("in stock");
        store.add_product(ProductId::new(1)).await.expect("in stock");
    }

    // a fresh process over the same file sees the same cart
    let storage = Arc::new(JsonFileStore::open(&path).await.expect("reopen storage"));
    let store = CartStore::open(
        stock,
        storage,
        Arc::new(RecordingNotifier::new()),
        CART_KEY,
    )
    .await;

    let snapshot = store.cart().await;
    let lines: Vec<(i32, u32)> = snapshot
        .lines
        .iter()
        .map(|line| (line.id.as_i32(), line.amount))
        .collect();
    assert_eq!(lines, vec![(1, 2), (2, 1)]);

    let _ = tokio::fs::remove_file(&path).await;
}
