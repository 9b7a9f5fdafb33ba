//! Generate config command implementation

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&self.output, template(&CliConfig::default()))
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("Configuration template written to {}", self.output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the values you want to change; omitted keys keep their defaults");
        println!("2. Use it with any command:");
        println!(
            "   protmap --config {} resolve -i genes.csv -p out/run",
            self.output.display()
        );

        Ok(())
    }
}

/// Commented TOML for `config`
fn template(config: &CliConfig) -> String {
    format!(
        r#"# protmap configuration
#
# Command-line flags override these values.

[service]
# Base URL of the UniProt REST service
base_url = "{base_url}"
# Per-request timeout in seconds
timeout_secs = {timeout_secs}
# Minimum spacing between requests in milliseconds (0 = no pacing)
min_interval_ms = {min_interval_ms}
# Hits requested per search
page_size = {page_size}

[resolver]
# NCBI taxonomy id searches are restricted to
organism_id = "{organism_id}"
# Accept a single unreviewed hit when the reviewed search finds nothing
allow_unreviewed_fallback = {allow_unreviewed_fallback}
# Fetch accession-shaped tokens directly when the symbol search is not conclusive
passthrough_accessions = {passthrough_accessions}

[retry]
# Attempts per lookup, including the first
max_attempts = {max_attempts}
# Delay before the first retry; doubles on each further retry
base_delay_ms = {base_delay_ms}
# Upper bound on any single delay
max_delay_ms = {max_delay_ms}

[performance]
# Concurrent lookups (0 = number of CPUs)
max_concurrency = {max_concurrency}

[batch]
# Jobs per batch file
capacity = {capacity}
"#,
        base_url = config.service.base_url,
        timeout_secs = config.service.timeout_secs,
        min_interval_ms = config.service.min_interval_ms,
        page_size = config.service.page_size,
        organism_id = config.resolver.organism_id,
        allow_unreviewed_fallback = config.resolver.allow_unreviewed_fallback,
        passthrough_accessions = config.resolver.passthrough_accessions,
        max_attempts = config.retry.max_attempts,
        base_delay_ms = config.retry.base_delay_ms,
        max_delay_ms = config.retry.max_delay_ms,
        max_concurrency = config.performance.max_concurrency,
        capacity = config.batch.capacity,
    )
}
