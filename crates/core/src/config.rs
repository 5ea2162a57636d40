//! # Catalog Configuration
//!
//! Centralized settings for the catalog client and state store.
//!
//! ## Example
//! ```rust,ignore
//! use pokedex_core::config::CatalogConfig;
//!
//! // Public PokéAPI, 5 minute cache
//! let config = CatalogConfig::default();
//!
//! // Local mirror with a shorter cache window
//! let config = CatalogConfig::new("http://localhost:9000/api/v2").with_cache_ttl_secs(30);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public catalog API
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Env var that overrides the catalog API base URL
pub const BASE_URL_ENV: &str = "POKEDEX_API_URL";

/// Storage slot holding the serialized favorites collection
pub const DEFAULT_FAVORITES_KEY: &str = "pokemonFavorites";

/// Configuration for the catalog client and store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL of the catalog API, without trailing slash
    pub base_url: String,
    /// Staleness window for cached responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Page size used by `load_more`
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout for the HTTP transport
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Key of the durable favorites slot
    #[serde(default = "default_favorites_key")]
    pub favorites_key: String,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_page_size() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_favorites_key() -> String {
    DEFAULT_FAVORITES_KEY.to_string()
}

fn default_user_agent() -> String {
    format!("pokedex-core/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CatalogConfig {
    /// Create a config pointing at a specific API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_ttl_secs: default_cache_ttl_secs(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            favorites_key: default_favorites_key(),
            user_agent: default_user_agent(),
        }
    }

    /// Defaults, with the base URL taken from `POKEDEX_API_URL` when set
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_favorites_key(mut self, key: impl Into<String>) -> Self {
        self.favorites_key = key.into();
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join a relative endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
