//! Lookup service boundary
//!
//! A [`LookupService`] issues exactly one query per call and reports either
//! the parsed hits or a classified [`LookupError`]. Retrying is the caller's
//! job (see [`crate::backoff`]).

pub mod mock;
pub mod uniprot;

pub use mock::{MockLookup, MockRecord};
pub use uniprot::UniProtClient;

use protmap_core::{Candidate, ErrorKind};
use std::fmt;
use std::time::Duration;

/// One record returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Primary accession
    pub accession: String,
    /// Recommended protein name
    pub protein_name: String,
    /// Gene names attached to the record
    pub gene_names: Vec<String>,
    /// Whether the record is manually reviewed
    pub reviewed: bool,
    /// Amino-acid sequence, when returned
    pub sequence: Option<String>,
}

impl Hit {
    /// Accession and name only
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            accession: self.accession.clone(),
            protein_name: self.protein_name.clone(),
        }
    }
}

/// A symbol search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Gene symbol, matched exactly
    pub symbol: String,
    /// Organism filter
    pub organism_id: String,
    /// Restrict to reviewed records
    pub reviewed_only: bool,
}

impl SearchQuery {
    /// Exact symbol, organism, reviewed records only
    pub fn strict(symbol: impl Into<String>, organism_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            organism_id: organism_id.into(),
            reviewed_only: true,
        }
    }

    /// Exact symbol and organism, any review status
    pub fn relaxed(symbol: impl Into<String>, organism_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            organism_id: organism_id.into(),
            reviewed_only: false,
        }
    }

    /// Structured query string understood by the service
    ///
    /// The symbol is always a quoted phrase, so spaces and query operators
    /// inside an input cell cannot change the structure of the query.
    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "gene_exact:{} AND organism_id:{}",
            quote_term(&self.symbol),
            self.organism_id
        );
        if self.reviewed_only {
            query.push_str(" AND reviewed:true");
        }
        query
    }
}

/// Quote a term, escaping `\` and `"`
fn quote_term(term: &str) -> String {
    let mut quoted = String::with_capacity(term.len() + 2);
    quoted.push('"');
    for c in term.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// A classified lookup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    /// Failure class
    pub kind: ErrorKind,
    /// Diagnostic message
    pub message: String,
    /// Server-provided wait hint for rate limiting
    pub retry_after: Option<Duration>,
}

impl LookupError {
    /// Create an error without a wait hint
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Attach a wait hint
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Whether the call may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for LookupError {}

/// Result of a single lookup call
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// One-shot access to the identifier service
pub trait LookupService: Send + Sync {
    /// Run a symbol search and return hits in service order
    fn search(&self, query: &SearchQuery) -> LookupResult<Vec<Hit>>;

    /// Fetch one record by accession; `Ok(None)` when no such record exists
    fn fetch(&self, accession: &str) -> LookupResult<Option<Hit>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
