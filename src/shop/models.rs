//! Data models for scraped listings and stored products.

use serde::{Deserialize, Serialize};

/// One product listing extracted from a page.
///
/// The serialized field names match the cache values and snapshot files
/// written by earlier versions of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    /// Product title, the reconciliation key
    #[serde(rename = "product_title")]
    pub title: String,
    /// Normalized price
    #[serde(rename = "product_price")]
    pub price: f64,
    /// Local path of the downloaded image
    #[serde(rename = "path_to_image")]
    pub image_ref: String,
}

impl ScrapedRecord {
    pub fn new(title: impl Into<String>, price: f64, image_ref: impl Into<String>) -> Self {
        Self { title: title.into(), price, image_ref: image_ref.into() }
    }
}

/// A product card read from the markup, before its image is downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub title: String,
    pub price: f64,
    pub image_url: String,
}

/// A product row held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    /// Assigned by the store, never changes
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub image_ref: String,
}
