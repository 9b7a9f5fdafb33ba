//! JSON outputs: batch files, overlap reports and comparisons

use super::ensure_parent;
use anyhow::{Context, Result};
use protmap_core::Batch;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write a value as pretty-printed JSON with a trailing newline
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let mut text = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write one `batch_{k:03}.json` per batch into `dir`
///
/// Stale batch files from an earlier run in the same directory are removed
/// first, so the directory always matches the current partition.
pub fn write_batches(dir: &Path, batches: &[Batch]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    remove_stale_batches(dir)?;

    let mut paths = Vec::with_capacity(batches.len());
    for batch in batches {
        let path = dir.join(batch.file_name());
        write_json(&path, &batch.jobs)?;
        paths.push(path);
    }
    Ok(paths)
}

fn remove_stale_batches(dir: &Path) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_batch = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("batch_") && n.ends_with(".json"));
        if is_batch {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
