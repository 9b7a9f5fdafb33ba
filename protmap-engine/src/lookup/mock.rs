//! In-memory lookup service
//!
//! Answers searches from a fixed record list, with optional scripted failures
//! per symbol or accession. Used for offline runs (`--fixtures`) and tests.

use super::{Hit, LookupError, LookupResult, LookupService, SearchQuery};
use crate::config::HUMAN_ORGANISM_ID;
use crate::error::{EngineError, Result};
use protmap_core::{normalize_symbol, ErrorKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One record served by [`MockLookup`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockRecord {
    /// Primary accession
    pub accession: String,
    /// Protein name
    pub protein_name: String,
    /// Gene symbols the record is found under
    #[serde(default)]
    pub genes: Vec<String>,
    /// Organism id
    #[serde(default = "default_organism")]
    pub organism_id: String,
    /// Review status
    #[serde(default = "default_reviewed")]
    pub reviewed: bool,
    /// Sequence
    #[serde(default)]
    pub sequence: Option<String>,
}

fn default_organism() -> String {
    HUMAN_ORGANISM_ID.to_string()
}

fn default_reviewed() -> bool {
    true
}

impl MockRecord {
    /// Reviewed human record
    pub fn reviewed(accession: &str, protein_name: &str, genes: &[&str]) -> Self {
        Self {
            accession: accession.to_string(),
            protein_name: protein_name.to_string(),
            genes: genes.iter().map(|g| g.to_string()).collect(),
            organism_id: default_organism(),
            reviewed: true,
            sequence: None,
        }
    }

    /// Unreviewed human record
    pub fn unreviewed(accession: &str, protein_name: &str, genes: &[&str]) -> Self {
        Self {
            reviewed: false,
            ..Self::reviewed(accession, protein_name, genes)
        }
    }

    /// Attach a sequence
    pub fn with_sequence(mut self, sequence: &str) -> Self {
        self.sequence = Some(sequence.to_string());
        self
    }

    fn to_hit(&self) -> Hit {
        Hit {
            accession: self.accession.clone(),
            protein_name: self.protein_name.clone(),
            gene_names: self.genes.clone(),
            reviewed: self.reviewed,
            sequence: self.sequence.clone(),
        }
    }
}

/// Scripted failure for one symbol or accession
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockFailure {
    /// Symbol or accession the failure applies to
    pub token: String,
    /// Failure class to report
    pub kind: ErrorKind,
    /// Fail only the first `times` calls; always when absent
    #[serde(default)]
    pub times: Option<u32>,
    /// `Retry-After` hint in seconds
    #[serde(default)]
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    records: Vec<MockRecord>,
    #[serde(default)]
    failures: Vec<MockFailure>,
}

/// Offline [`LookupService`]
#[derive(Debug, Default)]
pub struct MockLookup {
    records: Vec<MockRecord>,
    failures: Mutex<HashMap<String, MockFailure>>,
    calls: AtomicUsize,
    call_log: Mutex<Vec<String>>,
}

impl MockLookup {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record
    pub fn with_record(mut self, record: MockRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Script a failure for a symbol or accession
    pub fn with_failure(self, token: &str, kind: ErrorKind, times: Option<u32>) -> Self {
        self.insert_failure(MockFailure {
            token: token.to_string(),
            kind,
            times,
            retry_after_secs: None,
        });
        self
    }

    fn insert_failure(&self, failure: MockFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_symbol(&failure.token), failure);
    }

    /// Parse a JSON fixture (`{"records": [...], "failures": [...]}`)
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let mock = Self {
            records: fixture.records,
            ..Self::default()
        };
        for failure in fixture.failures {
            mock.insert_failure(failure);
        }
        Ok(mock)
    }

    /// Load a JSON fixture file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let fixture_error = |reason: String| EngineError::Fixture {
            path: path.display().to_string(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
        let mock = Self::from_json_str(&json).map_err(|e| fixture_error(e.to_string()))?;
        log::info!(
            "loaded {} fixture records from {}",
            mock.records.len(),
            path.display()
        );
        Ok(mock)
    }

    /// Total number of calls served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of calls that queried `token` (case-insensitive)
    pub fn calls_for(&self, token: &str) -> usize {
        let key = normalize_symbol(token);
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|logged| **logged == key)
            .count()
    }

    fn record_call(&self, token: &str) -> LookupResult<()> {
        let key = normalize_symbol(token);
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());

        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(failure) = failures.get_mut(&key) else {
            return Ok(());
        };
        match failure.times {
            Some(0) => return Ok(()),
            Some(remaining) => failure.times = Some(remaining - 1),
            None => {}
        }
        Err(scripted_error(failure))
    }
}

fn scripted_error(failure: &MockFailure) -> LookupError {
    LookupError::new(failure.kind, format!("scripted {} failure", failure.kind))
        .with_retry_after(failure.retry_after_secs.map(Duration::from_secs))
}

impl LookupService for MockLookup {
    fn search(&self, query: &SearchQuery) -> LookupResult<Vec<Hit>> {
        self.record_call(&query.symbol)?;
        let symbol = normalize_symbol(&query.symbol);
        Ok(self
            .records
            .iter()
            .filter(|r| r.organism_id == query.organism_id)
            .filter(|r| r.reviewed || !query.reviewed_only)
            .filter(|r| r.genes.iter().any(|g| normalize_symbol(g) == symbol))
            .map(MockRecord::to_hit)
            .collect())
    }

    fn fetch(&self, accession: &str) -> LookupResult<Option<Hit>> {
        self.record_call(accession)?;
        let key = normalize_symbol(accession);
        Ok(self
            .records
            .iter()
            .find(|r| normalize_symbol(&r.accession) == key)
            .map(MockRecord::to_hit))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
