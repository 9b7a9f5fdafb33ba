//! protmap CLI library
//!
//! This library provides the command-line interface for resolving gene lists
//! to protein accessions, comparing lists and batching downstream jobs.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use commands::{run, Cli};
pub use error::{CliError, CliResult};
