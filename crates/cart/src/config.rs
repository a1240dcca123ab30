//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOCK_API_URL` - Base URL of the stock/catalog API
//!
//! ## Optional
//! - `STOCK_API_TOKEN` - Bearer token for the stock API
//! - `STOCK_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `CART_STORAGE_PATH` - Local storage file (default: data/cart-storage.json)
//! - `CART_STORAGE_KEY` - Key of this cart's slot (default: marmalade:cart)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Path of the JSON file backing local persistence
    pub storage_path: PathBuf,
    /// Key identifying this cart's slot in the storage file
    pub storage_key: String,
    /// Stock API configuration
    pub stock: StockApiConfig,
}

/// Stock API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StockApiConfig {
    /// Base URL of the stock/catalog API
    pub base_url: String,
    /// Bearer token, if the API requires one
    pub access_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for StockApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage_path =
            PathBuf::from(get_env_or_default("CART_STORAGE_PATH", "data/cart-storage.json"));
        let storage_key = get_env_or_default("CART_STORAGE_KEY", "marmalade:cart");
        let stock = StockApiConfig::from_env()?;

        Ok(Self {
            storage_path,
            storage_key,
            stock,
        })
    }
}

impl StockApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = validate_base_url("STOCK_API_URL", &get_required_env("STOCK_API_URL")?)?;
        let access_token = get_optional_env("STOCK_API_TOKEN").map(SecretString::from);
        let timeout_secs = get_env_or_default("STOCK_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOCK_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            access_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate an http(s) base URL and strip any trailing slash.
fn validate_base_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("scheme must be http or https (got '{}')", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}
