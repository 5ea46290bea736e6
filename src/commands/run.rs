//! Run command: scrape, reconcile, snapshot.

use crate::auth::AccessGate;
use crate::config::Config;
use crate::error::ScrapeError;
use crate::ingest::{JsonFileCache, ProductStore, RecordCache, Reconciler, SqliteStore, write_snapshot};
use crate::shop::{PriceParser, Scraper, ShopClient, ShopFetch};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub new_records_count: usize,
    pub updated_records_count: usize,
    pub skipped_records_count: usize,
    pub scraped_records_count: usize,
}

/// Executes one pipeline run.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    /// Creates a new run command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Checks the token, opens the configured store and cache, and runs the
    /// pipeline over pages `1..=page_limit`.
    ///
    /// `page_limit` and `proxy` fall back to the configured values.
    pub async fn execute(
        &self,
        page_limit: Option<u32>,
        proxy: Option<String>,
        token: Option<&str>,
    ) -> Result<RunReport> {
        AccessGate::new(self.config.auth_token.clone()).verify(token)?;

        let page_limit = page_limit.or(self.config.page_limit).filter(|limit| *limit > 0);
        if page_limit.is_none() {
            return Err(ScrapeError::InvalidPageLimit.into());
        }

        let mut config = self.config.clone();
        if proxy.is_some() {
            config.proxy = proxy;
        }

        let client = ShopClient::new(&config).context("Failed to create HTTP client")?;
        let mut store = SqliteStore::open(&config.database_path)?;
        let mut cache = JsonFileCache::open(&config.cache_path)?;

        let report = self.execute_with(&client, &mut store, &mut cache, page_limit).await?;

        cache.close()?;
        Ok(report)
    }

    /// Runs the pipeline with provided collaborators (for testing).
    pub async fn execute_with<C: ShopFetch + ?Sized>(
        &self,
        client: &C,
        store: &mut dyn ProductStore,
        cache: &mut dyn RecordCache,
        page_limit: Option<u32>,
    ) -> Result<RunReport> {
        let prices = PriceParser::new(&self.config.currency_symbols);
        let scraper = Scraper::new(client, self.config.retry.clone(), prices, &self.config.images_dir);

        let records = scraper.run(&self.config.base_url, page_limit).await?;

        let reconciled = Reconciler::new(store, cache).reconcile(&records)?;
        write_snapshot(&self.config.snapshot_path, &records)?;

        info!("Scraped and updated {} new products", reconciled.new_count);

        Ok(RunReport {
            status: RunStatus::Success,
            new_records_count: reconciled.new_count,
            updated_records_count: reconciled.updated_count,
            skipped_records_count: reconciled.skipped_count,
            scraped_records_count: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::ingest::{MemoryCache, MemoryStore};
    use crate::shop::{RetryPolicy, ScrapedRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    /// Serves canned listing pages; every image download succeeds.
    struct MockShop {
        pages: HashMap<u32, String>,
        calls: AtomicU32,
    }

    impl MockShop {
        fn new(pages: Vec<(u32, String)>) -> Self {
            Self { pages: pages.into_iter().collect(), calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl ShopFetch for MockShop {
        async fn fetch_text(&self, url: &str) -> std::result::Result<String, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page = url.rsplit('=').next().and_then(|n| n.parse::<u32>().ok()).unwrap_or(0);
            self.pages.get(&page).cloned().ok_or_else(|| ScrapeError::transport(url, "status 404"))
        }

        async fn fetch_bytes(&self, _url: &str) -> std::result::Result<Vec<u8>, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0xff, 0xd8])
        }
    }

    fn listing(products: &[(&str, &str)]) -> String {
        let cards: String = products
            .iter()
            .map(|(title, price)| {
                format!(
                    r#"<div class="product-inner">
                        <img class="attachment-woocommerce_thumbnail" src="https://cdn.shop/{}.jpg">
                        <h2 class="woo-loop-product__title">{}</h2>
                        <span class="woocommerce-Price-amount">{}</span>
                    </div>"#,
                    title.to_lowercase(),
                    title,
                    price
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", cards)
    }

    fn test_config(dir: &TempDir) -> Config {
        Config {
            base_url: "https://shop.test/shop/".to_string(),
            retry: RetryPolicy::fixed(1, 0),
            images_dir: dir.path().join("images"),
            snapshot_path: dir.path().join("scraped_data.json"),
            database_path: dir.path().join("scraped_data.db"),
            cache_path: dir.path().join("scrape_cache.json"),
            ..Config::default()
        }
    }

    fn two_pages() -> MockShop {
        MockShop::new(vec![
            (1, listing(&[("A", "₹10.00"), ("B", "₹20.00")])),
            (2, listing(&[("A", "₹15.00")])),
        ])
    }

    #[tokio::test]
    async fn test_execute_with_last_price_wins() {
        let dir = TempDir::new().unwrap();
        let cmd = RunCommand::new(test_config(&dir));
        let client = two_pages();
        let mut store = MemoryStore::new();
        let mut cache = MemoryCache::new();

        let report = cmd.execute_with(&client, &mut store, &mut cache, Some(2)).await.unwrap();

        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.new_records_count, 2);
        assert_eq!(report.updated_records_count, 1);
        assert_eq!(report.scraped_records_count, 3);

        let stored: Vec<_> = store.products().iter().map(|p| (p.title.as_str(), p.price)).collect();
        assert_eq!(stored, vec![("A", 15.0), ("B", 20.0)]);
    }

    #[tokio::test]
    async fn test_execute_with_writes_snapshot_and_images() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let cmd = RunCommand::new(config.clone());
        let client = two_pages();

        cmd.execute_with(&client, &mut MemoryStore::new(), &mut MemoryCache::new(), Some(2)).await.unwrap();

        let snapshot: Vec<ScrapedRecord> =
            serde_json::from_str(&std::fs::read_to_string(&config.snapshot_path).unwrap()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[2].title, "A");
        assert_eq!(snapshot[2].price, 15.0);

        assert!(config.images_dir.join("a.jpg").exists());
        assert!(config.images_dir.join("b.jpg").exists());
    }

    #[tokio::test]
    async fn test_execute_with_second_run_skips_everything() {
        let dir = TempDir::new().unwrap();
        let cmd = RunCommand::new(test_config(&dir));
        let client = MockShop::new(vec![(1, listing(&[("A", "₹10.00"), ("B", "₹1,020.50")]))]);
        let mut store = MemoryStore::new();
        let mut cache = MemoryCache::new();

        cmd.execute_with(&client, &mut store, &mut cache, Some(1)).await.unwrap();
        let writes_after_first = store.writes;

        let report = cmd.execute_with(&client, &mut store, &mut cache, Some(1)).await.unwrap();

        assert_eq!(report.new_records_count, 0);
        assert_eq!(report.skipped_records_count, 2);
        assert_eq!(store.writes, writes_after_first);
    }

    #[tokio::test]
    async fn test_execute_with_malformed_price_fails_run() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let cmd = RunCommand::new(config.clone());
        let client = MockShop::new(vec![(1, listing(&[("A", "Call for price")]))]);
        let mut store = MemoryStore::new();

        let err = cmd.execute_with(&client, &mut store, &mut MemoryCache::new(), Some(1)).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<ScrapeError>(), Some(ScrapeError::MalformedPrice { .. })));
        assert_eq!(store.writes, 0);
        assert!(!config.snapshot_path.exists());
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_token_before_network() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.auth_token = Some("secret".to_string());
        let cmd = RunCommand::new(config.clone());

        let err = cmd.execute(Some(1), None, Some("wrong")).await.unwrap_err();

        assert_eq!(err.downcast_ref::<AuthError>(), Some(&AuthError::Unauthorized));
        assert!(!config.database_path.exists());
        assert!(!config.cache_path.exists());
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_page_limit() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let cmd = RunCommand::new(config.clone());

        for limit in [None, Some(0)] {
            let err = cmd.execute(limit, None, None).await.unwrap_err();
            assert!(matches!(err.downcast_ref::<ScrapeError>(), Some(ScrapeError::InvalidPageLimit)));
        }
        assert!(!config.database_path.exists());
    }

    #[test]
    fn test_report_serializes_status() {
        let report = RunReport {
            status: RunStatus::Success,
            new_records_count: 1,
            updated_records_count: 0,
            skipped_records_count: 0,
            scraped_records_count: 1,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["scraped_records_count"], 1);
    }
}
