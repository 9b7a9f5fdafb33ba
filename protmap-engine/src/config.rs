//! Configuration types for the engine

use crate::error::{EngineError, Result};
use std::time::Duration;

/// Default lookup service endpoint
pub const DEFAULT_BASE_URL: &str = "https://rest.uniprot.org";

/// NCBI taxonomy id for human
pub const HUMAN_ORGANISM_ID: &str = "9606";

/// Lookup service connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the REST service
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Minimum spacing between request starts, shared by all workers
    pub min_interval_ms: u64,
    /// Maximum number of hits requested per search
    pub page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            min_interval_ms: 0,
            page_size: 25,
        }
    }
}

impl ServiceConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Minimum spacing between requests, if any
    pub fn min_interval(&self) -> Option<Duration> {
        (self.min_interval_ms > 0).then(|| Duration::from_millis(self.min_interval_ms))
    }
}

/// Fallback chain settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Organism filter for symbol searches
    pub organism_id: String,
    /// Accept a single unreviewed hit when the reviewed search is empty
    pub allow_unreviewed_fallback: bool,
    /// Fetch accession-shaped tokens directly
    pub passthrough_accessions: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            organism_id: HUMAN_ORGANISM_ID.to_string(),
            allow_unreviewed_fallback: false,
            passthrough_accessions: true,
        }
    }
}

/// Retry budget for retryable lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Ceiling for any single delay
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Lookup service settings
    pub service: ServiceConfig,
    /// Resolver settings
    pub resolver: ResolverConfig,
    /// Retry settings
    pub retry: RetryConfig,
    /// Maximum number of concurrent lookups
    pub max_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            resolver: ResolverConfig::default(),
            retry: RetryConfig::default(),
            max_concurrency: 4,
        }
    }
}

impl EngineConfig {
    /// Create a configuration that stays well under public rate limits
    pub fn polite() -> Self {
        Self {
            service: ServiceConfig {
                min_interval_ms: 500,
                ..ServiceConfig::default()
            },
            retry: RetryConfig {
                max_attempts: 5,
                base_delay_ms: 2_000,
                max_delay_ms: 60_000,
            },
            max_concurrency: 2,
            ..Self::default()
        }
    }

    /// Create a configuration for in-process services
    ///
    /// No pacing and no backoff sleeps.
    pub fn offline() -> Self {
        Self {
            retry: RetryConfig {
                base_delay_ms: 0,
                max_delay_ms: 0,
                ..RetryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(EngineError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(EngineError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(EngineError::ConfigError(format!(
                "base_delay_ms ({}) exceeds max_delay_ms ({})",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        if self.service.timeout_secs == 0 {
            return Err(EngineError::ConfigError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.service.page_size == 0 {
            return Err(EngineError::ConfigError(
                "page_size must be greater than 0".to_string(),
            ));
        }
        if self.resolver.organism_id.trim().is_empty() {
            return Err(EngineError::ConfigError(
                "organism_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the polite preset
    pub fn polite(mut self) -> Self {
        self.config = EngineConfig::polite();
        self
    }

    /// Set the service base URL
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.service.base_url = url.into();
        self
    }

    /// Set the per-call timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.service.timeout_secs = secs;
        self
    }

    /// Set the minimum spacing between requests
    pub fn min_interval_ms(mut self, ms: u64) -> Self {
        self.config.service.min_interval_ms = ms;
        self
    }

    /// Set the number of hits requested per search
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.service.page_size = size;
        self
    }

    /// Set the organism filter
    pub fn organism<S: Into<String>>(mut self, organism_id: S) -> Self {
        self.config.resolver.organism_id = organism_id.into();
        self
    }

    /// Enable or disable the unreviewed fallback stage
    pub fn allow_unreviewed_fallback(mut self, enabled: bool) -> Self {
        self.config.resolver.allow_unreviewed_fallback = enabled;
        self
    }

    /// Enable or disable direct accession fetches
    pub fn passthrough_accessions(mut self, enabled: bool) -> Self {
        self.config.resolver.passthrough_accessions = enabled;
        self
    }

    /// Set the retry budget
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the concurrency cap (`None` = number of CPUs)
    pub fn max_concurrency(mut self, count: Option<usize>) -> Self {
        self.config.max_concurrency = count.unwrap_or_else(num_cpus::get);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
