//! Resolution orchestration for protmap
//!
//! This crate drives gene-symbol resolution against a lookup service: the
//! [`Resolver`] fallback chain, retry with backoff, a bounded worker pool and
//! a per-run [`ResolutionSession`] that feeds the core record table.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use protmap_engine::{EngineConfig, MockLookup, MockRecord, ResolutionSession};
//! use protmap_core::GeneQuery;
//!
//! let service = Arc::new(
//!     MockLookup::new().with_record(MockRecord::reviewed("P04637", "p53", &["TP53"])),
//! );
//! let session = ResolutionSession::from_config(&EngineConfig::offline(), service).unwrap();
//!
//! let queries = vec![GeneQuery::new("TP53"), GeneQuery::new("NOTAGENE")];
//! let ingested = session.resolve_list(&queries, "screen", "screen.csv");
//! assert_eq!(ingested.set.as_slice(), ["P04637"]);
//! assert_eq!(ingested.report.summary().not_found, 1);
//! ```

#![warn(missing_docs)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod lookup;
pub mod pool;
pub mod resolver;
pub mod session;

// Re-export key types
pub use backoff::{BackoffPolicy, Exhausted};
pub use config::{EngineConfig, EngineConfigBuilder, ResolverConfig, RetryConfig, ServiceConfig};
pub use error::{EngineError, Result};
pub use lookup::{
    Hit, LookupError, LookupResult, LookupService, MockLookup, MockRecord, SearchQuery,
    UniProtClient,
};
pub use pool::WorkerPool;
pub use resolver::Resolver;
pub use session::{ResolutionSession, SessionStats};
