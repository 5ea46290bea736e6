//! HTTP client for the shop using wreq for browser TLS fingerprint emulation.

use crate::config::Config;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

/// Raw HTTP access to the shop - enables mocking for tests.
///
/// Any network failure or non-success status is reported as
/// `ScrapeError::Transport`.
#[async_trait]
pub trait ShopFetch: Send + Sync {
    /// Fetches a page and returns its body as text.
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError>;

    /// Fetches a resource and returns its raw bytes.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

/// Shop HTTP client with browser impersonation.
///
/// The proxy, when configured, applies to every request the client makes.
pub struct ShopClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl ShopClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, delay_ms: config.delay_ms, delay_jitter_ms: config.delay_jitter_ms })
    }

    /// Performs a GET request and checks the status.
    async fn get(&self, url: &str, accept: &str) -> Result<wreq::Response, ScrapeError> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", accept)
            .header("Accept-Language", "en-IN,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| ScrapeError::transport(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(ScrapeError::transport(url, format!("status {}", status)));
        }

        Ok(response)
    }

    /// Adds the configured politeness delay.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl ShopFetch for ShopClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .get(url, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .await?;
        response.text().await.map_err(|e| ScrapeError::transport(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let response = self.get(url, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8").await?;
        let bytes = response.bytes().await.map_err(|e| ScrapeError::transport(url, e))?;
        Ok(bytes.to_vec())
    }
}
