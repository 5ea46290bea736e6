//! List command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::ingest::SqliteStore;
use anyhow::Result;
use tracing::debug;

/// Prints the products currently in the store.
pub struct ListCommand {
    config: Config,
}

impl ListCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Opens the configured store and returns formatted output.
    pub fn execute(&self) -> Result<String> {
        let store = SqliteStore::open(&self.config.database_path)?;
        self.execute_with_store(&store)
    }

    pub fn execute_with_store(&self, store: &SqliteStore) -> Result<String> {
        let products = store.list()?;
        debug!("Listing {} stored products", products.len());

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_products(&products))
    }
}
