//! Engine error types
//!
//! Only run-level problems surface here. A lookup that fails for one symbol is
//! reported through `ResolutionResult::Failed` instead, so it never aborts the
//! pass.

use protmap_core::CoreError;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Domain layer error
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The HTTP client could not be constructed
    #[error("failed to build lookup client: {0}")]
    ClientBuild(String),

    /// The worker pool could not be constructed
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// Invalid engine configuration
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// A fixture file for the offline service could not be loaded
    #[error("invalid fixture file {path}: {reason}")]
    Fixture {
        /// Path of the fixture file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
