//! Persisted settings from `.pokedex/config.json`, layered over the
//! environment defaults.

use pokedex_core::storage::io::{get_runtime_path, read_runtime_file, save_runtime_file};
use pokedex_core::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";
const ENV_FILE: &str = ".env";

/// Every field is optional; unset fields keep the default
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_key: Option<String>,
}

impl PersistedConfig {
    /// Read `config.json`; a missing or unreadable file yields the defaults
    pub async fn load() -> Self {
        match read_runtime_file(CONFIG_FILE).await {
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring malformed config.json");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read config.json");
                Self::default()
            }
        }
    }

    /// Every field set from an effective configuration
    pub fn from_effective(config: &CatalogConfig) -> Self {
        Self {
            base_url: Some(config.base_url.clone()),
            cache_ttl_secs: Some(config.cache_ttl_secs),
            page_size: Some(config.page_size),
            request_timeout_secs: Some(config.request_timeout_secs),
            favorites_key: Some(config.favorites_key.clone()),
        }
    }

    /// Write `config.json`, returning its path
    pub async fn save(&self) -> anyhow::Result<PathBuf> {
        let content = serde_json::to_string_pretty(self)?;
        save_runtime_file(CONFIG_FILE, &content).await
    }

    /// Overlay the set fields onto `config`
    pub fn apply(self, mut config: CatalogConfig) -> CatalogConfig {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config = config.with_cache_ttl_secs(ttl);
        }
        if let Some(page_size) = self.page_size {
            config = config.with_page_size(page_size);
        }
        if let Some(timeout) = self.request_timeout_secs {
            config = config.with_request_timeout_secs(timeout);
        }
        if let Some(key) = self.favorites_key {
            config = config.with_favorites_key(key);
        }
        config
    }
}

/// Environment, then `.pokedex/.env`, then `config.json`
pub async fn resolve() -> CatalogConfig {
    let env_path = get_runtime_path().join(ENV_FILE);
    if env_path.exists() {
        if let Err(e) = dotenvy::from_path(&env_path) {
            tracing::warn!(path = ?env_path, error = %e, "Could not load .env");
        }
    }

    PersistedConfig::load().await.apply(CatalogConfig::from_env())
}
