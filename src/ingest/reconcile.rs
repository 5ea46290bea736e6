//! Cache-then-store reconciliation of scraped records.
//!
//! Per record, keyed by title:
//!
//! 1. cached with the same price: skip, nothing is written;
//! 2. otherwise look the title up in the store and update it in place, or
//!    insert it as a new product;
//! 3. after an update or insert, stage the incoming record for the cache.
//!
//! Records are applied in order, so the last occurrence of a title wins.
//! Staged records reach the cache only after the store commit covering them
//! succeeds, so the cache never claims a row the store rolled back.
//! Writes are not atomic across records: if one record fails, the store is
//! committed for the records before it and the error is returned.

use crate::ingest::cache::RecordCache;
use crate::ingest::store::ProductStore;
use crate::shop::models::ScrapedRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// What reconciliation decided for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Updated,
    Inserted,
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub new_count: usize,
    pub updated_count: usize,
    pub skipped_count: usize,
}

impl ReconcileReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped_count += 1,
            Outcome::Updated => self.updated_count += 1,
            Outcome::Inserted => self.new_count += 1,
        }
    }
}

/// Applies scraped records to a store through a cache.
pub struct Reconciler<'a> {
    store: &'a mut dyn ProductStore,
    cache: &'a mut dyn RecordCache,
    /// Serialized records waiting for the next successful commit
    staged: HashMap<String, String>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut dyn ProductStore, cache: &'a mut dyn RecordCache) -> Self {
        Self { store, cache, staged: HashMap::new() }
    }

    /// Reconciles all records and commits the store.
    pub fn reconcile(&mut self, records: &[ScrapedRecord]) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for record in records {
            match self.apply(record) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    // Keep what was applied before the failing record.
                    if let Err(commit_err) = self.commit() {
                        warn!("Failed to commit partial reconciliation: {:#}", commit_err);
                    }
                    return Err(e).with_context(|| format!("Failed to reconcile '{}'", record.title));
                }
            }
        }

        self.commit()?;

        info!(
            "Reconciled {} records: {} new, {} updated, {} unchanged",
            records.len(),
            report.new_count,
            report.updated_count,
            report.skipped_count
        );
        Ok(report)
    }

    /// Commits the store, then publishes staged records to the cache.
    ///
    /// A failed commit drops the staged records.
    fn commit(&mut self) -> Result<()> {
        if let Err(e) = self.store.commit() {
            debug!("Discarding {} staged cache entries", self.staged.len());
            self.staged.clear();
            return Err(e);
        }

        for (title, value) in std::mem::take(&mut self.staged) {
            self.cache.set(&title, value)?;
        }
        Ok(())
    }

    /// Runs the decision procedure for a single record.
    fn apply(&mut self, record: &ScrapedRecord) -> Result<Outcome> {
        if let Some(cached) = self.cached(&record.title)? {
            // Exact comparison; the cached value round-trips through JSON unchanged.
            if cached.price == record.price {
                trace!("Unchanged: {}", record.title);
                return Ok(Outcome::Skipped);
            }
        }

        let outcome = match self.store.find_by_title(&record.title)? {
            Some(existing) => {
                debug!("Updating '{}' (id {}): {} -> {}", record.title, existing.id, existing.price, record.price);
                self.store.update(existing.id, record.price, &record.image_ref)?;
                Outcome::Updated
            }
            None => {
                let created = self.store.insert(record)?;
                debug!("Inserted '{}' as id {}", record.title, created.id);
                Outcome::Inserted
            }
        };

        let value = serde_json::to_string(record).context("Failed to serialize record for cache")?;
        self.staged.insert(record.title.clone(), value);

        Ok(outcome)
    }

    fn cached(&self, title: &str) -> Result<Option<ScrapedRecord>> {
        let raw = match self.staged.get(title) {
            Some(staged) => Some(staged.clone()),
            None => self.cache.get(title)?,
        };
        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Ignoring unreadable cache entry for '{}': {}", title, e);
                Ok(None)
            }
        }
    }
}
