//! Batch command implementation

use super::{list_name, RunContext};
use crate::error::CliError;
use crate::input::{resolve_patterns, Table};
use crate::output::write_batches;
use anyhow::{Context, Result};
use clap::Args;
use protmap_core::{
    all_pairs, bait_vs_targets, normalize_symbol, validate_jobs, BatchPartitioner, Deduplicator,
    ProteinSet, ResolutionResult, ResolvedRow,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Arguments for the batch command
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Jobs per batch [default: from config, 30]
    #[arg(long, value_name = "N")]
    pub capacity: Option<usize>,

    /// Resolved CSV whose accessions are the targets
    #[arg(long, value_name = "FILE", conflicts_with = "from_overlap", required_unless_present = "from_overlap")]
    pub targets: Option<PathBuf>,

    /// Overlap report whose region supplies the targets
    #[arg(long, value_name = "FILE", requires = "region")]
    pub from_overlap: Option<PathBuf>,

    /// Region key in the overlap report, e.g. "A&B"
    #[arg(long, value_name = "KEY", requires = "from_overlap")]
    pub region: Option<String>,

    /// Resolved CSVs registering known accessions (files or glob patterns)
    #[arg(long, value_name = "FILE")]
    pub records: Vec<String>,

    /// Bait accession paired with every target (repeatable)
    #[arg(long, value_name = "ACCESSION", conflicts_with = "all_pairs", required_unless_present = "all_pairs")]
    pub bait: Vec<String>,

    /// Pair every two distinct targets instead of using baits
    #[arg(long)]
    pub all_pairs: bool,

    /// Output prefix; batches go to {prefix}_batches/
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
struct RegionEntry {
    accessions: Vec<String>,
}

impl BatchArgs {
    /// Execute the batch command
    pub fn execute(&self, ctx: &RunContext) -> Result<()> {
        let capacity = self.capacity.unwrap_or(ctx.config.batch.capacity);
        let partitioner = BatchPartitioner::new(capacity)?;

        let records = Deduplicator::new();
        for path in resolve_patterns(&self.records)? {
            ingest_resolved_csv(&records, &path)?;
        }

        let targets = match (&self.targets, &self.from_overlap, &self.region) {
            (Some(path), _, _) => ingest_resolved_csv(&records, path)?,
            (None, Some(path), Some(region)) => read_region(path, region)?,
            _ => {
                return Err(CliError::InvalidArgument(
                    "either --targets or --from-overlap with --region is required".to_string(),
                )
                .into())
            }
        };
        log::info!("{} targets from '{}'", targets.len(), targets.name());

        let jobs = if self.all_pairs {
            all_pairs(&targets)
        } else {
            let baits: Vec<String> = self.bait.iter().map(|b| normalize_symbol(b)).collect();
            bait_vs_targets(&baits, &targets)
        };
        validate_jobs(&jobs, |accession| {
            records.contains(accession) || targets.contains(accession)
        })?;

        let batches = partitioner.partition(&jobs);
        let dir = PathBuf::from(format!("{}_batches", self.prefix));
        let paths = write_batches(&dir, &batches)?;

        println!(
            "{} jobs in {} batches (capacity {})",
            jobs.len(),
            paths.len(),
            partitioner.capacity()
        );
        println!("  {}", dir.display());
        Ok(())
    }
}

/// Register the rows of a resolved CSV and return them as a set
fn ingest_resolved_csv(records: &Deduplicator, path: &Path) -> Result<ProteinSet> {
    let rows = Table::read(path)?.resolved_rows()?;
    let results: Vec<ResolutionResult> = rows.into_iter().map(row_to_result).collect();
    let ingested = records.ingest_from(&results, &list_name(path), &path.display().to_string());
    Ok(ingested.set)
}

fn row_to_result(row: ResolvedRow) -> ResolutionResult {
    ResolutionResult::Resolved {
        accession: row.accession,
        protein_name: row.protein_name,
        source_symbol: row.symbol,
        provenance: row.provenance,
        sequence: None,
    }
}

/// Targets from one region of an overlap report
///
/// The key may list set names in any order.
fn read_region(path: &Path, key: &str) -> Result<ProteinSet> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.display().to_string()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let regions: BTreeMap<String, RegionEntry> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse overlap report {}", path.display()))?;

    let wanted = name_set(key);
    let Some((found, entry)) = regions.iter().find(|(k, _)| name_set(k) == wanted) else {
        let available: Vec<&str> = regions.keys().map(String::as_str).collect();
        return Err(CliError::InvalidArgument(format!(
            "region '{}' not in {} (available: {})",
            key,
            path.display(),
            available.join(", ")
        ))
        .into());
    };

    Ok(ProteinSet::from_accessions(
        found.as_str(),
        path.display().to_string(),
        entry.accessions.iter().map(|a| normalize_symbol(a)),
    ))
}

fn name_set(key: &str) -> BTreeSet<&str> {
    key.split('&').map(str::trim).filter(|n| !n.is_empty()).collect()
}
