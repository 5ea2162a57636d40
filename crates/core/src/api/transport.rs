//! # HTTP Transport
//!
//! The generic fetch capability the catalog client is built on. Production
//! code uses [`ReqwestTransport`]; tests plug in an in-memory stub.

use async_trait::async_trait;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};

/// A completed HTTP exchange. Non-2xx statuses are still `Ok` here; status
/// interpretation belongs to the client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET-only HTTP capability
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request. Errors only on network-level failure.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CatalogError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}
