//! Configuration management for the backend core.
//!
//! Configuration can be set via environment variables:
//! - `BOOKS_API_URL` - Optional. Search provider base URL. Defaults to the
//!   public Google Books endpoint.
//! - `BOOKS_API_KEY` - Optional. API key passed through to the provider.
//! - `RESULT_STORE` - Optional. `memory` or `sqlite`. Defaults to `sqlite`.
//! - `DATA_DIR` - Optional. Directory for SQLite databases. Defaults to
//!   `./data`.
//! - `DISPLAY_PAGE_SIZE` - Optional. Results shown per turn. Defaults to `5`.

use std::path::PathBuf;

use thiserror::Error;

use crate::books::DISPLAY_PAGE_SIZE;
use crate::storage::StoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Search provider base URL override (None = provider default)
    pub books_api_url: Option<String>,

    /// Search provider API key
    pub books_api_key: Option<String>,

    /// Which store backend holds per-user state
    pub store: StoreKind,

    /// Directory for persistent store files
    pub data_dir: PathBuf,

    /// Results shown per conversational turn
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let books_api_url = std::env::var("BOOKS_API_URL").ok();
        let books_api_key = std::env::var("BOOKS_API_KEY").ok();

        let store = std::env::var("RESULT_STORE")
            .map(|s| StoreKind::from_str(&s))
            .unwrap_or_default();

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let page_size = std::env::var("DISPLAY_PAGE_SIZE")
            .unwrap_or_else(|_| DISPLAY_PAGE_SIZE.to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("DISPLAY_PAGE_SIZE".to_string(), format!("{}", e)))?;

        Ok(Self {
            books_api_url,
            books_api_key,
            store,
            data_dir,
            page_size,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(store: StoreKind, data_dir: PathBuf) -> Self {
        Self {
            books_api_url: None,
            books_api_key: None,
            store,
            data_dir,
            page_size: DISPLAY_PAGE_SIZE,
        }
    }
}
