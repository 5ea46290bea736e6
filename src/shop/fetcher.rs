//! Listing page fetching with retry.

use crate::error::ScrapeError;
use crate::shop::client::ShopFetch;
use crate::shop::retry::{RetryMode, RetryPolicy};
use tracing::{debug, warn};

/// Builds the URL of one listing page.
pub fn page_url(base_url: &str, page: u32) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, separator, page)
}

/// Fetches listing pages, retrying transport failures per the policy.
pub struct PageFetcher<'a, C: ShopFetch + ?Sized> {
    client: &'a C,
    policy: RetryPolicy,
}

impl<'a, C: ShopFetch + ?Sized> PageFetcher<'a, C> {
    pub fn new(client: &'a C, policy: RetryPolicy) -> Self {
        if policy.mode == RetryMode::Unbounded {
            warn!("Page fetches will retry forever ({})", policy.describe());
        }
        Self { client, policy }
    }

    /// Fetches one page's markup.
    ///
    /// Blocks the run while waiting between attempts. Under an unbounded
    /// policy this only returns once the page is fetched.
    pub async fn fetch(&self, base_url: &str, page: u32) -> Result<String, ScrapeError> {
        let url = page_url(base_url, page);
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let err = match self.client.fetch_text(&url).await {
                Ok(html) => {
                    debug!("Fetched page {} on attempt {} ({} bytes)", page, attempts, html.len());
                    return Ok(html);
                }
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            let Some(delay) = self.policy.delay_after(attempts) else {
                warn!("Giving up on page {} after {} attempts: {}", page, attempts, err);
                return Err(ScrapeError::RetriesExhausted { page, attempts, source: Box::new(err) });
            };

            warn!("Failed to fetch page {} (attempt {}): {}. Retrying in {:?}", page, attempts, err, delay);
            tokio::time::sleep(delay).await;
        }
    }
}
