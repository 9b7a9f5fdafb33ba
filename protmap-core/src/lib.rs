//! Canonical protein sets, batch partitioning and N-way overlap regions
//!
//! This crate is the pure domain layer of protmap. It holds no I/O and no
//! network code: resolution outcomes come in as [`ResolutionResult`] values,
//! and everything derived from them (canonical sets, side reports, job
//! batches, overlap regions) is computed deterministically.
//!
//! # Example
//!
//! ```rust
//! use protmap_core::{compute_overlap, partition, Job, ProteinSet};
//!
//! let dna = ProteinSet::from_accessions("dna", "dna.tsv", ["P1", "P2", "P3"]);
//! let rna = ProteinSet::from_accessions("rna", "rna.tsv", ["P2", "P3", "P4"]);
//!
//! let report = compute_overlap(&[dna.clone(), rna]).unwrap();
//! assert_eq!(report.region(&["dna", "rna"]).unwrap().count(), 2);
//! assert_eq!(report.total(), 4);
//!
//! let jobs: Vec<Job> = dna.iter().map(|target| Job::pair("Q04740", target)).collect();
//! let batches = partition(&jobs, 2).unwrap();
//! assert_eq!(batches.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod accession;
pub mod compare;
pub mod dedup;
pub mod error;
pub mod jobs;
pub mod overlap;
pub mod partition;
pub mod set;
pub mod types;

// Re-export key types
pub use compare::{compare_with_reference, JoinKey, ReferenceComparison};
pub use dedup::{
    AmbiguousRow, Deduplicator, Ingested, IssueRow, ResolutionReport, ResolvedRow, Summary,
};
pub use error::{CoreError, Result};
pub use jobs::{all_pairs, bait_vs_targets, validate_jobs, Job};
pub use overlap::{compute_overlap, OverlapReport, OverlapSummary, PairwiseStats, Region};
pub use partition::{partition, Batch, BatchPartitioner};
pub use set::ProteinSet;
pub use types::{
    normalize_symbol, unique_queries, Candidate, ErrorKind, GeneQuery, Outcome, ProteinRecord,
    Provenance, ResolutionResult,
};
