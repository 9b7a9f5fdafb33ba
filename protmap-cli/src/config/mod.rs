//! Configuration module
//!
//! An optional TOML file supplies defaults for every command; command-line
//! flags override individual values.

use crate::error::CliError;
use anyhow::{Context, Result};
use protmap_engine::{EngineConfig, ResolverConfig, RetryConfig, ServiceConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Lookup service configuration
    #[serde(default)]
    pub service: ServiceSection,

    /// Resolver configuration
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetrySection,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceSection,

    /// Batch configuration
    #[serde(default)]
    pub batch: BatchSection,
}

/// `[service]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceSection {
    /// Base URL of the REST service
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Minimum spacing between requests in milliseconds
    pub min_interval_ms: u64,
    /// Hits requested per search
    pub page_size: usize,
}

impl Default for ServiceSection {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            base_url: service.base_url,
            timeout_secs: service.timeout_secs,
            min_interval_ms: service.min_interval_ms,
            page_size: service.page_size,
        }
    }
}

/// `[resolver]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverSection {
    /// Organism filter
    pub organism_id: String,
    /// Accept single unreviewed hits
    pub allow_unreviewed_fallback: bool,
    /// Fetch accession-shaped tokens directly
    pub passthrough_accessions: bool,
}

impl Default for ResolverSection {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        Self {
            organism_id: resolver.organism_id,
            allow_unreviewed_fallback: resolver.allow_unreviewed_fallback,
            passthrough_accessions: resolver.passthrough_accessions,
        }
    }
}

/// `[retry]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySection {
    /// Attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let retry = RetryConfig::default();
        Self {
            max_attempts: retry.max_attempts,
            base_delay_ms: retry.base_delay_ms,
            max_delay_ms: retry.max_delay_ms,
        }
    }
}

/// `[performance]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PerformanceSection {
    /// Concurrent lookups (0 = number of CPUs)
    pub max_concurrency: usize,
}

impl Default for PerformanceSection {
    fn default() -> Self {
        Self {
            max_concurrency: EngineConfig::default().max_concurrency,
        }
    }
}

/// `[batch]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchSection {
    /// Jobs per batch
    pub capacity: usize,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

impl CliConfig {
    /// Load a configuration file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str::<Self>(text).map_err(|e| CliError::ConfigError(e.to_string()).into())
    }

    /// Engine settings derived from this file
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            service: ServiceConfig {
                base_url: self.service.base_url.clone(),
                timeout_secs: self.service.timeout_secs,
                min_interval_ms: self.service.min_interval_ms,
                page_size: self.service.page_size,
            },
            resolver: ResolverConfig {
                organism_id: self.resolver.organism_id.clone(),
                allow_unreviewed_fallback: self.resolver.allow_unreviewed_fallback,
                passthrough_accessions: self.resolver.passthrough_accessions,
            },
            retry: RetryConfig {
                max_attempts: self.retry.max_attempts,
                base_delay_ms: self.retry.base_delay_ms,
                max_delay_ms: self.retry.max_delay_ms,
            },
            max_concurrency: resolve_concurrency(self.performance.max_concurrency),
        }
    }
}

/// Map 0 to the number of CPUs
pub fn resolve_concurrency(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get()
    } else {
        requested
    }
}
