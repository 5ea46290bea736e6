//! Shop-specific modules for fetching, parsing, and data models.

pub mod client;
pub mod extractor;
pub mod fetcher;
pub mod images;
pub mod models;
pub mod price;
pub mod retry;
pub mod scrape;
pub mod selectors;

pub use client::{ShopClient, ShopFetch};
pub use extractor::RecordExtractor;
pub use fetcher::PageFetcher;
pub use images::ImageRetriever;
pub use models::{ListingCard, ScrapedRecord, StoredProduct};
pub use price::PriceParser;
pub use retry::{RetryMode, RetryPolicy};
pub use scrape::Scraper;
