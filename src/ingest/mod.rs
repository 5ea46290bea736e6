//! Persisting scraped records: cache, store, reconciliation, and snapshot.

pub mod cache;
pub mod reconcile;
pub mod snapshot;
pub mod store;

pub use cache::{JsonFileCache, RecordCache};
pub use reconcile::{Outcome, ReconcileReport, Reconciler};
pub use snapshot::write_snapshot;
pub use store::{ProductStore, SqliteStore};

#[cfg(test)]
pub use cache::MemoryCache;
#[cfg(test)]
pub use store::MemoryStore;
