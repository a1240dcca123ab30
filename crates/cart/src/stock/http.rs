//! HTTP client for the stock API.
//!
//! Plain REST JSON endpoints: `GET {base}/stock/{id}` for levels and
//! `GET {base}/products/{id}` for metadata. Product metadata is cached via
//! `moka` (5-minute TTL); stock levels are never cached, so every mutation
//! validates against a fresh level.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use marmalade_core::ProductId;

use super::{ProductRecord, StockError, StockLevel, StockService};
use crate::config::StockApiConfig;

/// Client for the stock API.
///
/// Cheaply cloneable; all clones share the connection pool and the product
/// metadata cache.
#[derive(Clone)]
pub struct HttpStockClient {
    inner: Arc<HttpStockClientInner>,
}

struct HttpStockClientInner {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
    products: Cache<ProductId, ProductRecord>,
}

impl HttpStockClient {
    /// Create a new stock API client.
    #[must_use]
    pub fn new(config: &StockApiConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(HttpStockClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                access_token: config
                    .access_token
                    .as_ref()
                    .map(|token| token.expose_secret().to_string()),
                timeout: config.timeout,
                products,
            }),
        }
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        product_id: ProductId,
    ) -> Result<T, StockError> {
        let url = format!("{}/{path}", self.inner.base_url);

        let mut request = self
            .inner
            .client
            .get(&url)
            .timeout(self.inner.timeout)
            .header("Accept", "application/json");
        if let Some(token) = &self.inner.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StockError::NotFound(product_id));
        }

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StockError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Stock API returned non-success status"
            );
            return Err(StockError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse stock API response"
            );
            StockError::Parse(e)
        })
    }
}

#[async_trait]
impl StockService for HttpStockClient {
    #[instrument(skip(self))]
    async fn get_stock(&self, product_id: ProductId) -> Result<StockLevel, StockError> {
        self.get_json(&format!("stock/{product_id}"), product_id)
            .await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: ProductId) -> Result<ProductRecord, StockError> {
        // Check cache
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductRecord = self
            .get_json(&format!("products/{product_id}"), product_id)
            .await?;

        // Cache the result
        self.inner
            .products
            .insert(product_id, product.clone())
            .await;

        Ok(product)
    }
}
