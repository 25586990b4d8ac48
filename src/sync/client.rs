//! HTTP client for the price server's `/sync` endpoint.

use super::models::SyncResult;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Trait for running a sync against the price server - enables mocking for tests.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Requests a fresh scrape for `query` and returns the parsed response body.
    async fn sync(&self, query: &str) -> Result<SyncResult>;
}

/// Price server client.
pub struct SyncClient {
    client: Client,
    base_url: String,
}

impl SyncClient {
    /// Creates a client for the backend URL resolved from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, config.backend_url())
    }

    /// Creates a client with a custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for a query.
    fn sync_url(&self, query: &str) -> String {
        format!("{}/sync?q={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl SyncBackend for SyncClient {
    async fn sync(&self, query: &str) -> Result<SyncResult> {
        let url = self.sync_url(query);

        info!("Syncing prices for: {}", query);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        // Failed scrapes come back as 500 with a JSON body, so the status alone
        // does not decide anything.
        let status = response.status();
        debug!("Response status: {}", status);
        if !status.is_success() {
            warn!("Price server answered with status {}", status);
        }

        let body = response.text().await.context("Failed to read response body")?;

        let result: SyncResult = serde_json::from_str(&body)
            .with_context(|| format!("Price server returned a non-JSON body (status {})", status))?;

        debug!(
            "Received {} products with {} prices, {} progress entries",
            result.results.len(),
            result.total_prices(),
            result.progress.len()
        );
        Ok(result)
    }
}
