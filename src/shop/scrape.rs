//! Scrape loop over a bounded range of listing pages.

use crate::error::ScrapeError;
use crate::shop::client::ShopFetch;
use crate::shop::extractor::RecordExtractor;
use crate::shop::fetcher::PageFetcher;
use crate::shop::images::ImageRetriever;
use crate::shop::models::ScrapedRecord;
use crate::shop::price::PriceParser;
use crate::shop::retry::RetryPolicy;
use std::path::PathBuf;
use tracing::{debug, info};

/// Drives page fetching and extraction for one run.
///
/// The proxy for the run is whatever the client was built with.
pub struct Scraper<'a, C: ShopFetch + ?Sized> {
    fetcher: PageFetcher<'a, C>,
    images: ImageRetriever<'a, C>,
    prices: PriceParser,
}

impl<'a, C: ShopFetch + ?Sized> Scraper<'a, C> {
    pub fn new(
        client: &'a C,
        retry: RetryPolicy,
        prices: PriceParser,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher: PageFetcher::new(client, retry),
            images: ImageRetriever::new(client, images_dir),
            prices,
        }
    }

    /// Scrapes pages `1..=page_limit` and returns all records, ordered by
    /// page and then by position on the page.
    ///
    /// The first failure aborts the remaining pages.
    pub async fn run(&self, base_url: &str, page_limit: Option<u32>) -> Result<Vec<ScrapedRecord>, ScrapeError> {
        let page_limit = match page_limit {
            Some(limit) if limit > 0 => limit,
            _ => return Err(ScrapeError::InvalidPageLimit),
        };

        let extractor = RecordExtractor::new(&self.prices, &self.images);
        let mut all_records: Vec<ScrapedRecord> = Vec::new();

        for page in 1..=page_limit {
            info!("Scraping page {}/{}", page, page_limit);

            let html = self.fetcher.fetch(base_url, page).await?;
            let records = extractor.extract(&html).await?;

            if records.is_empty() {
                debug!("No products on page {}", page);
            }

            all_records.extend(records);
        }

        info!("Scraped {} records from {} pages", all_records.len(), page_limit);
        Ok(all_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    /// Serves canned pages keyed by page URL; images always succeed.
    struct MockShop {
        pages: HashMap<String, String>,
        page_calls: AtomicU32,
    }

    impl MockShop {
        fn new(pages: &[(u32, String)]) -> Self {
            Self {
                pages: pages.iter().map(|(n, html)| (format!("http://shop/?page={}", n), html.clone())).collect(),
                page_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ShopFetch for MockShop {
        async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            self.pages.get(url).cloned().ok_or_else(|| ScrapeError::transport(url, "status 404"))
        }

        async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>, ScrapeError> {
            Ok(b"img".to_vec())
        }
    }

    fn listing(products: &[(&str, f64)]) -> String {
        let mut html = String::from("<html><body><ul class=\"products\">");
        for (title, price) in products {
            html.push_str(&format!(
                r#"<li><div class="product-inner">
                    <img class="attachment-woocommerce_thumbnail" src="http://cdn/{slug}.jpg">
                    <h2 class="woo-loop-product__title">{title}</h2>
                    <span class="woocommerce-Price-amount amount">₹{price:.2}</span>
                </div></li>"#,
                slug = title.to_lowercase().replace(' ', "-"),
                title = title,
                price = price
            ));
        }
        html.push_str("</ul></body></html>");
        html
    }

    fn scraper<'a>(client: &'a MockShop, dir: &TempDir) -> Scraper<'a, MockShop> {
        Scraper::new(client, RetryPolicy::fixed(1, 0), PriceParser::default(), dir.path())
    }

    #[tokio::test]
    async fn test_run_preserves_page_then_document_order() {
        let dir = TempDir::new().unwrap();
        let client = MockShop::new(&[
            (1, listing(&[("A", 10.0), ("B", 20.0)])),
            (2, listing(&[("A", 15.0)])),
        ]);

        let records = scraper(&client, &dir).run("http://shop/", Some(2)).await.unwrap();

        let summary: Vec<_> = records.iter().map(|r| (r.title.as_str(), r.price)).collect();
        assert_eq!(summary, vec![("A", 10.0), ("B", 20.0), ("A", 15.0)]);
        assert_eq!(client.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_requires_positive_limit() {
        let dir = TempDir::new().unwrap();
        let client = MockShop::new(&[]);

        for limit in [None, Some(0)] {
            let err = scraper(&client, &dir).run("http://shop/", limit).await.unwrap_err();
            assert!(matches!(err, ScrapeError::InvalidPageLimit));
        }
        assert_eq!(client.page_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_aborts_on_failed_page() {
        let dir = TempDir::new().unwrap();
        let client = MockShop::new(&[(1, listing(&[("A", 10.0)])), (3, listing(&[("C", 30.0)]))]);

        let err = scraper(&client, &dir).run("http://shop/", Some(3)).await.unwrap_err();
        assert!(matches!(err, ScrapeError::RetriesExhausted { page: 2, .. }));
        // Page 3 is never requested
        assert_eq!(client.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_allows_empty_pages() {
        let dir = TempDir::new().unwrap();
        let client = MockShop::new(&[(1, listing(&[])), (2, listing(&[("Z", 1.0)]))]);

        let records = scraper(&client, &dir).run("http://shop/", Some(2)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Z");
    }
}
