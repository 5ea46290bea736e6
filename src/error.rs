//! Error types for the scrape layer.

use thiserror::Error;

/// Failures raised while fetching and extracting listing pages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure or non-success HTTP status.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// A page fetch gave up under a bounded retry policy.
    #[error("page {page} could not be fetched after {attempts} attempts")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },

    /// Price text that is not a plain non-negative decimal once cleaned.
    #[error("malformed price: {text:?}")]
    MalformedPrice { text: String },

    /// A product card does not match the expected page template.
    #[error("extraction failed: {message}")]
    Extraction { message: String },

    #[error("failed to download image {url}: {message}")]
    ImageDownload { url: String, message: String },

    #[error("page limit must be a positive integer")]
    InvalidPageLimit,
}

impl ScrapeError {
    pub fn transport(url: &str, message: impl ToString) -> Self {
        Self::Transport { url: url.to_string(), message: message.to_string() }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction { message: message.into() }
    }

    pub fn image(url: &str, message: impl ToString) -> Self {
        Self::ImageDownload { url: url.to_string(), message: message.to_string() }
    }

    /// Returns true for failures a page fetch may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
