//! JSON snapshot of the latest run's records.

use crate::shop::models::ScrapedRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Overwrites `path` with the records of the current run.
pub fn write_snapshot(path: impl AsRef<Path>, records: &[ScrapedRecord]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(records).context("Failed to serialize snapshot")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
