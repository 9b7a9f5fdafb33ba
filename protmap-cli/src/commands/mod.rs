//! CLI command implementations

use crate::config::{resolve_concurrency, CliConfig};
use crate::input::QueryOptions;
use crate::progress::ProgressReporter;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use protmap_core::{GeneQuery, Ingested, Summary};
use protmap_engine::{
    EngineConfig, LookupService, MockLookup, ResolutionSession, UniProtClient,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod batch;
pub mod compare;
pub mod generate_config;
pub mod overlap;
pub mod resolve;

/// Gene list resolution, protein set overlap and job batching
#[derive(Debug, Parser)]
#[command(name = "protmap", author, version, about, long_about = None)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress bars and logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true, env = "PROTMAP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve gene symbols in a delimited file to protein accessions
    Resolve(resolve::ResolveArgs),

    /// Compute exclusive overlap regions between named protein lists
    Overlap(overlap::OverlapArgs),

    /// Compare a resolved list against a reference list
    Compare(compare::CompareArgs),

    /// Build capacity-bounded job batches
    Batch(batch::BatchArgs),

    /// Write a configuration template with the default settings
    GenerateConfig(generate_config::GenerateConfigArgs),
}

/// State shared by a command invocation
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Loaded configuration file (or defaults)
    pub config: CliConfig,
    /// Suppress progress output
    pub quiet: bool,
}

/// Parse-independent entry point
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.global.verbose, cli.global.quiet);
    log::debug!("arguments: {:?}", cli);

    let ctx = RunContext {
        config: CliConfig::load(cli.global.config.as_deref())?,
        quiet: cli.global.quiet,
    };

    match &cli.command {
        Commands::Resolve(args) => args.execute(&ctx),
        Commands::Overlap(args) => args.execute(&ctx),
        Commands::Compare(args) => args.execute(&ctx),
        Commands::Batch(args) => args.execute(&ctx),
        Commands::GenerateConfig(args) => args.execute(),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // A second initialization (tests calling `run` repeatedly) is harmless
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}

/// Lookup service options
#[derive(Debug, Args, Clone, Default)]
pub struct LookupArgs {
    /// Organism taxonomy id [default: from config, 9606]
    #[arg(long, value_name = "TAXON")]
    pub organism: Option<String>,

    /// Accept a single unreviewed hit when the reviewed search is empty
    #[arg(long)]
    pub relaxed: bool,

    /// Answer lookups from a JSON fixture file instead of the REST service
    #[arg(long, value_name = "FILE")]
    pub fixtures: Option<PathBuf>,

    /// Concurrent lookups (0 = number of CPUs) [default: from config, 4]
    #[arg(short = 't', long, value_name = "COUNT")]
    pub threads: Option<usize>,
}

impl LookupArgs {
    /// Engine configuration with command-line overrides applied
    pub fn engine_config(&self, config: &CliConfig) -> EngineConfig {
        let mut engine = config.to_engine_config();
        if let Some(organism) = &self.organism {
            engine.resolver.organism_id = organism.clone();
        }
        if self.relaxed {
            engine.resolver.allow_unreviewed_fallback = true;
        }
        if let Some(threads) = self.threads {
            engine.max_concurrency = resolve_concurrency(threads);
        }
        engine
    }

    /// Build a resolution session for this invocation
    pub fn session(&self, ctx: &RunContext) -> Result<ResolutionSession> {
        let engine = self.engine_config(&ctx.config);
        let service: Arc<dyn LookupService> = match &self.fixtures {
            Some(path) => Arc::new(MockLookup::from_json_file(path)?),
            None => Arc::new(UniProtClient::new(&engine.service)?),
        };
        log::info!("lookup service: {}", service.name());
        Ok(ResolutionSession::from_config(&engine, service)?)
    }
}

/// Input column options
#[derive(Debug, Args, Clone, Default)]
pub struct ColumnArgs {
    /// Column holding symbols or accessions [default: first column]
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Column carried through as free-text context
    #[arg(long, value_name = "NAME")]
    pub context_column: Option<String>,

    /// Split cells on ';' into several queries
    #[arg(long)]
    pub split_multi: bool,
}

impl ColumnArgs {
    /// Reader options for these flags
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            column: self.column.clone(),
            context_column: self.context_column.clone(),
            split_multi: self.split_multi,
        }
    }
}

/// List name derived from a file path (its stem)
pub fn list_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("list")
        .to_string()
}

/// Resolve one list with a progress bar
pub fn resolve_with_progress(
    session: &ResolutionSession,
    queries: &[GeneQuery],
    list_name: &str,
    source: &str,
    quiet: bool,
) -> Ingested {
    let mut progress = ProgressReporter::new(quiet);
    progress.init_queries(list_name, ResolutionSession::distinct_count(queries) as u64);
    let ingested = session.resolve_list_with_progress(queries, list_name, source, || {
        progress.query_completed()
    });
    progress.finish();
    ingested
}

/// Per-category count line
pub fn format_summary(list_name: &str, summary: &Summary) -> String {
    format!(
        "{}: {} resolved, {} ambiguous, {} not found, {} failed ({} total)",
        list_name,
        summary.resolved,
        summary.ambiguous,
        summary.not_found,
        summary.failed,
        summary.total()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "protmap", "resolve", "-i", "genes.csv", "-p", "out/run", "-vv", "-q",
        ])
        .unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.quiet);
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn test_lookup_overrides() {
        let args = LookupArgs {
            organism: Some("10090".to_string()),
            relaxed: true,
            fixtures: None,
            threads: Some(2),
        };
        let engine = args.engine_config(&CliConfig::default());
        assert_eq!(engine.resolver.organism_id, "10090");
        assert!(engine.resolver.allow_unreviewed_fallback);
        assert_eq!(engine.max_concurrency, 2);

        let defaults = LookupArgs::default().engine_config(&CliConfig::default());
        assert_eq!(defaults, EngineConfig::default());
    }

    #[test]
    fn test_list_name() {
        assert_eq!(list_name(Path::new("data/dna_binding.tsv")), "dna_binding");
        assert_eq!(list_name(Path::new("/")), "list");
    }

    #[test]
    fn test_format_summary() {
        let summary = Summary {
            resolved: 2,
            ambiguous: 1,
            not_found: 1,
            failed: 0,
        };
        assert_eq!(
            format_summary("screen", &summary),
            "screen: 2 resolved, 1 ambiguous, 1 not found, 0 failed (4 total)"
        );
    }
}
