//! CSV side reports for one resolved list

use super::prefixed_path;
use anyhow::{Context, Result};
use protmap_core::{IssueRow, ResolutionReport};
use std::path::{Path, PathBuf};

/// Write `resolved`, `ambiguous`, `not_found` and `failed` CSVs for a report
///
/// All four files are written even when empty, so reruns replace stale
/// output. Returns the paths in that order.
pub fn write_resolution_report(prefix: &str, report: &ResolutionReport) -> Result<Vec<PathBuf>> {
    let resolved = prefixed_path(prefix, "resolved.csv")?;
    let mut writer = open(&resolved)?;
    writer.write_record(["symbol", "accession", "protein_name", "provenance_flag"])?;
    for row in &report.resolved {
        writer.write_record([
            row.symbol.as_str(),
            row.accession.as_str(),
            row.protein_name.as_str(),
            row.provenance.as_str(),
        ])?;
    }
    finish(writer, &resolved)?;

    let ambiguous = prefixed_path(prefix, "ambiguous.csv")?;
    let mut writer = open(&ambiguous)?;
    writer.write_record(["symbol", "candidate_accessions", "candidate_names"])?;
    for row in &report.ambiguous {
        writer.write_record([
            row.symbol.clone(),
            row.joined_accessions(),
            row.joined_names(),
        ])?;
    }
    finish(writer, &ambiguous)?;

    let not_found = prefixed_path(prefix, "not_found.csv")?;
    write_issues(&not_found, &report.not_found)?;
    let failed = prefixed_path(prefix, "failed.csv")?;
    write_issues(&failed, &report.failed)?;

    log::info!(
        "wrote reports for '{}' with prefix {}",
        report.list_name,
        prefix
    );
    Ok(vec![resolved, ambiguous, not_found, failed])
}

fn write_issues(path: &Path, rows: &[IssueRow]) -> Result<()> {
    let mut writer = open(path)?;
    writer.write_record(["symbol", "error_kind", "message"])?;
    for row in rows {
        writer.write_record([
            row.symbol.as_str(),
            row.error_kind.as_str(),
            row.message.as_str(),
        ])?;
    }
    finish(writer, path)
}

fn open(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn finish(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<()> {
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}
