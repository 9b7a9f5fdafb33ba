//! Error handling for the CLI application

use std::fmt;

/// Fatal, user-facing CLI errors
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// A required input column is absent
    MissingColumn {
        /// Requested column
        column: String,
        /// File that was searched
        path: String,
    },
    /// Configuration error
    ConfigError(String),
    /// Invalid or inconsistent command-line arguments
    InvalidArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::MissingColumn { column, path } => {
                write!(f, "Missing column '{column}' in {path}")
            }
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
