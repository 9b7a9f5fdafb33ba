//! Compare command implementation

use super::RunContext;
use crate::input::Table;
use crate::output::{prefixed_path, write_json};
use anyhow::Result;
use clap::{Args, ValueEnum};
use protmap_core::{compare_with_reference, JoinKey};
use std::path::PathBuf;

/// Field joined against the reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoinArg {
    /// Queried gene symbols
    Symbol,
    /// Resolved accessions
    Accession,
}

impl From<JoinArg> for JoinKey {
    fn from(arg: JoinArg) -> Self {
        match arg {
            JoinArg::Symbol => JoinKey::Symbol,
            JoinArg::Accession => JoinKey::Accession,
        }
    }
}

/// Arguments for the compare command
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// A `{prefix}_resolved.csv` written by `protmap resolve`
    #[arg(long, value_name = "FILE")]
    pub resolved: PathBuf,

    /// Reference list file
    #[arg(long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Reference column [default: first column]
    #[arg(long, value_name = "NAME")]
    pub reference_column: Option<String>,

    /// Join key
    #[arg(long, value_enum, default_value_t = JoinArg::Symbol)]
    pub join: JoinArg,

    /// Output prefix; writes {prefix}_comparison.json
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: String,
}

impl CompareArgs {
    /// Execute the compare command
    pub fn execute(&self, _ctx: &RunContext) -> Result<()> {
        let rows = Table::read(&self.resolved)?.resolved_rows()?;
        let reference = Table::read(&self.reference)?.column(self.reference_column.as_deref())?;
        log::info!(
            "comparing {} resolved rows against {} reference entries",
            rows.len(),
            reference.len()
        );

        let comparison = compare_with_reference(&rows, &reference, self.join.into())?;
        let path = prefixed_path(&self.prefix, "comparison.json")?;
        write_json(&path, &comparison)?;

        println!(
            "overlap: {}, reference only: {}, resolved only: {}",
            comparison.overlap.len(),
            comparison.reference_only.len(),
            comparison.resolved_only.len()
        );
        println!("  {}", path.display());
        Ok(())
    }
}
