//! Marmalade cart library.
//!
//! The cart state container for the Marmalade storefront: add item, remove
//! item, change quantity. Every mutation is validated against a remote stock
//! API and mirrored into a local storage slot on success; the cart is
//! hydrated from that slot at startup.
//!
//! # Architecture
//!
//! [`store::CartStore`] owns the in-memory cart and talks to three injected
//! collaborators:
//!
//! - [`stock::StockService`] - read-only stock levels and product metadata
//! - [`storage::CartStorage`] - one serialized blob under a fixed key
//! - [`notify::Notifier`] - fire-and-forget user-facing messages
//!
//! Production implementations ([`stock::HttpStockClient`],
//! [`storage::JsonFileStore`], [`notify::LogNotifier`]) are wired up by
//! [`CartStore::from_config`]; tests swap in the mock implementations that
//! ship alongside each trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use marmalade_cart::{CartStore, config::CartConfig};
//! use marmalade_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config).await?;
//!
//! store.add_product(ProductId::new(7)).await?;
//! let cart = store.cart().await;
//! println!("{} items", cart.total_quantity());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod notify;
pub mod stock;
pub mod storage;
pub mod store;

pub use cart::{Cart, LineItem};
pub use error::CartError;
pub use store::CartStore;
