//! stall-scraper - product listing scraper with cache-then-store reconciliation
//!
//! Walks the paginated listing of a WooCommerce shop, downloads product
//! images, and records title and price changes in a SQLite store.

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod shop;

pub use config::Config;
pub use error::ScrapeError;
pub use shop::models::{ListingCard, ScrapedRecord, StoredProduct};
