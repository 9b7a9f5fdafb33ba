//! Overlap command implementation

use super::{format_summary, resolve_with_progress, ColumnArgs, LookupArgs, RunContext};
use crate::error::CliError;
use crate::input::Table;
use crate::output::{prefixed_path, write_json, write_resolution_report};
use anyhow::Result;
use clap::Args;
use protmap_core::accession::canonical_accession;
use protmap_core::{compute_overlap, OverlapReport, ProteinSet};
use std::path::PathBuf;

/// A named input list, given as `NAME=FILE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSpec {
    /// Set name used in region keys
    pub name: String,
    /// Input file
    pub path: PathBuf,
}

/// Parse `NAME=FILE`
pub fn parse_set_spec(value: &str) -> std::result::Result<SetSpec, String> {
    let (name, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{value}'"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=FILE, got '{value}'"));
    }
    if name.contains('&') {
        return Err(format!("set name '{name}' must not contain '&'"));
    }
    Ok(SetSpec {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

/// Arguments for the overlap command
#[derive(Debug, Args)]
pub struct OverlapArgs {
    /// Named input list (repeat for each set)
    #[arg(short, long = "set", value_name = "NAME=FILE", required = true, value_parser = parse_set_spec)]
    pub sets: Vec<SetSpec>,

    /// Inputs already hold accessions; skip resolution
    #[arg(long)]
    pub accessions: bool,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Output prefix; writes {prefix}_overlap_report.json and {prefix}_overlap_summary.json
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: String,

    #[command(flatten)]
    pub lookup: LookupArgs,
}

impl OverlapArgs {
    /// Execute the overlap command
    pub fn execute(&self, ctx: &RunContext) -> Result<()> {
        if self.sets.len() < 2 {
            return Err(CliError::InvalidArgument(
                "overlap needs at least two --set lists".to_string(),
            )
            .into());
        }

        let sets = if self.accessions {
            self.read_accession_sets()?
        } else {
            self.resolve_sets(ctx)?
        };

        let report = compute_overlap(&sets)?;
        let report_path = prefixed_path(&self.prefix, "overlap_report.json")?;
        write_json(&report_path, &report)?;
        let summary_path = prefixed_path(&self.prefix, "overlap_summary.json")?;
        write_json(&summary_path, &report.summary())?;

        print_regions(&report);
        println!("  {}", report_path.display());
        println!("  {}", summary_path.display());
        Ok(())
    }

    fn read_accession_sets(&self) -> Result<Vec<ProteinSet>> {
        let options = self.columns.options();
        let mut sets = Vec::with_capacity(self.sets.len());
        for spec in &self.sets {
            let queries = Table::read(&spec.path)?.queries(&options)?;
            let accessions = queries.into_iter().map(|query| {
                canonical_accession(&query.symbol).unwrap_or_else(|| {
                    log::warn!(
                        "'{}' in {} is not accession-shaped; kept as-is",
                        query.symbol,
                        spec.path.display()
                    );
                    query.symbol
                })
            });
            sets.push(ProteinSet::from_accessions(
                spec.name.as_str(),
                spec.path.display().to_string(),
                accessions,
            ));
        }
        Ok(sets)
    }

    fn resolve_sets(&self, ctx: &RunContext) -> Result<Vec<ProteinSet>> {
        let options = self.columns.options();
        let session = self.lookup.session(ctx)?;
        let mut sets = Vec::with_capacity(self.sets.len());
        for spec in &self.sets {
            let queries = Table::read(&spec.path)?.queries(&options)?;
            let source = spec.path.display().to_string();
            let ingested = resolve_with_progress(&session, &queries, &spec.name, &source, ctx.quiet);
            write_resolution_report(&format!("{}_{}", self.prefix, spec.name), &ingested.report)?;
            println!("{}", format_summary(&spec.name, &ingested.report.summary()));
            sets.push(ingested.set);
        }

        let stats = session.stats();
        log::info!(
            "{} distinct accessions across {} lists ({} memo hits)",
            session.dedup().len(),
            sets.len(),
            stats.memo_hits
        );
        Ok(sets)
    }
}

fn print_regions(report: &OverlapReport) {
    let width = report
        .regions()
        .iter()
        .map(|r| r.key().len())
        .max()
        .unwrap_or(0)
        .max("region".len());
    println!("{:<width$}  {:>7}", "region", "count");
    for region in report.regions() {
        println!("{:<width$}  {:>7}", region.key(), region.count());
    }
    println!("{:<width$}  {:>7}", "union", report.total());
}
