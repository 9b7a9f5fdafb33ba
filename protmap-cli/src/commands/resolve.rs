//! Resolve command implementation

use super::{format_summary, list_name, resolve_with_progress, ColumnArgs, LookupArgs, RunContext};
use crate::input::Table;
use crate::output::{prefixed_path, write_fasta, write_resolution_report};
use anyhow::Result;
use clap::Args;
use protmap_core::ProteinRecord;
use std::path::PathBuf;

/// Arguments for the resolve command
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Input file (.csv, or .tsv/.tab/.txt for tab-delimited)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Output prefix; files are written as {prefix}_{kind}
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: String,

    #[command(flatten)]
    pub lookup: LookupArgs,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub fn execute(&self, ctx: &RunContext) -> Result<()> {
        let table = Table::read(&self.input)?;
        let queries = table.queries(&self.columns.options())?;
        if queries.is_empty() {
            log::warn!("{} has no queries", self.input.display());
        }

        let session = self.lookup.session(ctx)?;
        let name = list_name(&self.input);
        let source = self.input.display().to_string();
        let ingested = resolve_with_progress(&session, &queries, &name, &source, ctx.quiet);

        let paths = write_resolution_report(&self.prefix, &ingested.report)?;

        let records: Vec<ProteinRecord> = ingested
            .set
            .iter()
            .filter_map(|accession| session.dedup().record(accession))
            .collect();
        if records.iter().any(|r| r.sequence.is_some()) {
            let fasta = prefixed_path(&self.prefix, "resolved.fasta")?;
            let written = write_fasta(&fasta, &records)?;
            log::info!("wrote {} sequences to {}", written, fasta.display());
        }

        let stats = session.stats();
        log::info!(
            "{} remote resolutions, {} memo hits",
            stats.resolved_remotely,
            stats.memo_hits
        );

        println!("{}", format_summary(&name, &ingested.report.summary()));
        for path in paths {
            println!("  {}", path.display());
        }
        Ok(())
    }
}
