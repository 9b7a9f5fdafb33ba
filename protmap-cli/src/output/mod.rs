//! Output writers
//!
//! Every file is named `{prefix}_{suffix}`; missing parent directories of the
//! prefix are created.

pub mod fasta;
pub mod json;
pub mod reports;

pub use fasta::write_fasta;
pub use json::{write_batches, write_json};
pub use reports::write_resolution_report;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Path for `{prefix}_{suffix}`, creating the parent directory if needed
pub fn prefixed_path(prefix: &str, suffix: &str) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{prefix}_{suffix}"));
    ensure_parent(&path)?;
    Ok(path)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
