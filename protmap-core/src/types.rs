//! Core data model: queries, resolution outcomes and protein records

use serde::{Deserialize, Serialize};
use std::fmt;

/// One gene symbol (or accession) to resolve
///
/// Symbols are whitespace-trimmed on construction and compared
/// case-insensitively through [`GeneQuery::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneQuery {
    /// Trimmed symbol as it appeared in the input
    pub symbol: String,
    /// Opaque provenance carried through from the input row
    pub context: Option<String>,
}

impl GeneQuery {
    /// Create a query from a raw input token
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self {
            symbol: symbol.as_ref().trim().to_string(),
            context: None,
        }
    }

    /// Create a query carrying a free-text annotation
    pub fn with_context(symbol: impl AsRef<str>, context: impl Into<String>) -> Self {
        let context = context.into();
        Self {
            symbol: symbol.as_ref().trim().to_string(),
            context: if context.trim().is_empty() {
                None
            } else {
                Some(context)
            },
        }
    }

    /// Case-normalized identity of this query
    pub fn key(&self) -> String {
        normalize_symbol(&self.symbol)
    }

    /// Whether the symbol is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.symbol.is_empty()
    }
}

/// Case-normalize a symbol or accession for comparison
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Collapse queries that share a case-normalized symbol
///
/// The surviving spelling is the lexicographically smallest one, and the
/// output is sorted by key, so the result does not depend on input order.
/// Blank queries are dropped.
pub fn unique_queries(queries: &[GeneQuery]) -> Vec<GeneQuery> {
    let mut by_key: std::collections::BTreeMap<String, GeneQuery> =
        std::collections::BTreeMap::new();

    for query in queries.iter().filter(|q| !q.is_blank()) {
        by_key
            .entry(query.key())
            .and_modify(|existing| {
                if query.symbol < existing.symbol {
                    *existing = query.clone();
                }
            })
            .or_insert_with(|| query.clone());
    }

    by_key.into_values().collect()
}

/// Failure classes for a lookup that did not produce an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The call exceeded its deadline
    Timeout,
    /// The service asked us to slow down (HTTP 429)
    RateLimited,
    /// Connection failure or server-side error (HTTP 5xx)
    Unavailable,
    /// The service refused the query (HTTP 4xx other than 429)
    Rejected,
    /// The payload could not be decoded
    MalformedResponse,
}

impl ErrorKind {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::RateLimited | ErrorKind::Unavailable
        )
    }

    /// Stable report label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Rejected => "rejected",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a `Resolved` answer was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Single reviewed hit for the exact symbol
    Reviewed,
    /// Input was already an accession and the record was fetched directly
    AccessionPassthrough,
    /// Single hit only after dropping the reviewed filter
    UnreviewedFallback,
}

impl Provenance {
    /// Stable report label
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Reviewed => "reviewed",
            Provenance::AccessionPassthrough => "accession_passthrough",
            Provenance::UnreviewedFallback => "unreviewed_fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reviewed" => Ok(Provenance::Reviewed),
            "accession_passthrough" => Ok(Provenance::AccessionPassthrough),
            "unreviewed_fallback" => Ok(Provenance::UnreviewedFallback),
            other => Err(format!("unknown provenance flag '{other}'")),
        }
    }
}

/// One candidate record in an ambiguous answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate accession
    pub accession: String,
    /// Candidate protein name
    pub protein_name: String,
}

/// Outcome of resolving one [`GeneQuery`]
///
/// Produced once per query and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionResult {
    /// Exactly one usable record
    Resolved {
        /// Canonical accession, never empty
        accession: String,
        /// Recommended protein name
        protein_name: String,
        /// Symbol that was queried
        source_symbol: String,
        /// Which query stage produced the answer
        provenance: Provenance,
        /// Amino-acid sequence when the service returned one
        sequence: Option<String>,
    },
    /// More than one hit; never auto-resolved
    Ambiguous {
        /// Symbol that was queried
        source_symbol: String,
        /// Candidates in service order
        candidates: Vec<Candidate>,
    },
    /// Every stage came back empty
    NotFound {
        /// Symbol that was queried
        source_symbol: String,
    },
    /// The lookup itself failed
    Failed {
        /// Symbol that was queried
        source_symbol: String,
        /// Failure class of the last attempt
        error_kind: ErrorKind,
        /// Diagnostic message of the last attempt
        message: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },
}

/// Report category of a [`ResolutionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// See [`ResolutionResult::Resolved`]
    Resolved,
    /// See [`ResolutionResult::Ambiguous`]
    Ambiguous,
    /// See [`ResolutionResult::NotFound`]
    NotFound,
    /// See [`ResolutionResult::Failed`]
    Failed,
}

impl ResolutionResult {
    /// The symbol this result answers
    pub fn source_symbol(&self) -> &str {
        match self {
            ResolutionResult::Resolved { source_symbol, .. }
            | ResolutionResult::Ambiguous { source_symbol, .. }
            | ResolutionResult::NotFound { source_symbol }
            | ResolutionResult::Failed { source_symbol, .. } => source_symbol,
        }
    }

    /// Report category
    pub fn outcome(&self) -> Outcome {
        match self {
            ResolutionResult::Resolved { .. } => Outcome::Resolved,
            ResolutionResult::Ambiguous { .. } => Outcome::Ambiguous,
            ResolutionResult::NotFound { .. } => Outcome::NotFound,
            ResolutionResult::Failed { .. } => Outcome::Failed,
        }
    }

    /// The resolved accession, if any
    pub fn accession(&self) -> Option<&str> {
        match self {
            ResolutionResult::Resolved { accession, .. } => Some(accession),
            _ => None,
        }
    }

    /// Whether this outcome is final for the run
    ///
    /// `Failed` results are transient: a later run may succeed, so they are
    /// never memoized.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResolutionResult::Failed { .. })
    }
}

/// Canonical protein record, keyed by accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinRecord {
    /// Primary key
    pub accession: String,
    /// Human-readable protein name
    pub display_name: String,
    /// Amino-acid sequence, when known
    pub sequence: Option<String>,
}
