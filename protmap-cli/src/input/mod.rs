//! Input handling module

pub mod glob_resolver;
pub mod table;

pub use glob_resolver::resolve_patterns;
pub use table::{delimiter_for, QueryOptions, Table};
