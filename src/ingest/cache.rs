//! Fast record cache keyed by title.
//!
//! The cache is a hint: a missing or unreadable entry only costs a store
//! lookup.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key-value cache holding serialized records.
pub trait RecordCache {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// Cache persisted as a JSON object in a single file.
///
/// Entries are loaded on open and written back on `close`, or on drop if
/// `close` was never called.
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl JsonFileCache {
    /// Opens the cache file, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse cache file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        debug!("Opened cache {} with {} entries", path.display(), entries.len());
        Ok(Self { path, entries, dirty: false })
    }

    /// Writes pending entries to disk.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.entries).context("Failed to serialize cache")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;

        self.dirty = false;
        debug!("Flushed {} cache entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    /// Flushes and releases the cache, reporting any write failure.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}

impl RecordCache for JsonFileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }
}

impl Drop for JsonFileCache {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush cache on drop: {:#}", e);
        }
    }
}

/// In-memory cache that counts writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: std::collections::HashMap<String, String>,
    pub writes: usize,
}

#[cfg(test)]
impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl RecordCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}
