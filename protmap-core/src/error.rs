//! Core error types
//!
//! These are configuration- and input-level errors. Per-query lookup failures
//! are not errors at this layer; they travel as [`ResolutionResult::Failed`]
//! values so that one bad query never aborts a run.
//!
//! [`ResolutionResult::Failed`]: crate::ResolutionResult::Failed

use thiserror::Error;

/// Errors raised by the pure domain layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Batch capacity must be strictly positive
    #[error("invalid batch capacity {capacity}: capacity must be greater than 0")]
    InvalidCapacity {
        /// The rejected capacity
        capacity: usize,
    },

    /// A job references an accession that is not in the record table
    #[error("job {job_index} references unknown accession '{accession}'")]
    UnknownAccession {
        /// Position of the offending job in the job list
        job_index: usize,
        /// The accession that could not be found
        accession: String,
    },

    /// A job with no accessions
    #[error("job {job_index} is empty")]
    EmptyJob {
        /// Position of the offending job in the job list
        job_index: usize,
    },

    /// Two sets in one overlap computation share a name
    #[error("duplicate set name '{name}'")]
    DuplicateSetName {
        /// The repeated name
        name: String,
    },

    /// Set names must be non-empty and must not contain the region key separator
    #[error("invalid set name '{name}': names must be non-empty and must not contain '&'")]
    InvalidSetName {
        /// The rejected name
        name: String,
    },

    /// Overlap computation needs at least one set
    #[error("overlap computation requires at least one set")]
    NoSets,

    /// Too many sets for region enumeration
    #[error("too many sets for overlap regions: {count} (max: {max})")]
    TooManySets {
        /// Number of sets supplied
        count: usize,
        /// Maximum number of sets supported
        max: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
