//! Canonical set building and deduplication
//!
//! The [`Deduplicator`] owns the accession → [`ProteinRecord`] table for a run.
//! Two symbols that resolve to the same accession share one record, and a
//! list that names the same gene twice contributes one member to its set.
//!
//! Ingestion is idempotent and order-independent: the set returned for a list
//! depends only on which accessions resolved, never on row order or on which
//! thread inserted a record first.

use crate::set::ProteinSet;
use crate::types::{normalize_symbol, Candidate, ProteinRecord, Provenance, ResolutionResult};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// One row of the resolved report
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedRow {
    /// Queried symbol
    pub symbol: String,
    /// Resolved accession
    pub accession: String,
    /// Protein name
    pub protein_name: String,
    /// Query stage that produced the answer
    pub provenance: Provenance,
}

/// One row of the ambiguous report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousRow {
    /// Queried symbol
    pub symbol: String,
    /// All candidates, in service order
    pub candidates: Vec<Candidate>,
}

impl AmbiguousRow {
    /// Candidate accessions joined with `;`
    pub fn joined_accessions(&self) -> String {
        self.candidates
            .iter()
            .map(|c| c.accession.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Candidate names joined with `;`
    pub fn joined_names(&self) -> String {
        self.candidates
            .iter()
            .map(|c| c.protein_name.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// One row of the not-found or failed report
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IssueRow {
    /// Queried symbol
    pub symbol: String,
    /// Failure label (`not_found` or an error kind)
    pub error_kind: String,
    /// Human-readable detail
    pub message: String,
}

/// Per-category counts for one list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Resolved queries
    pub resolved: usize,
    /// Ambiguous queries
    pub ambiguous: usize,
    /// Queries with no hits
    pub not_found: usize,
    /// Queries whose lookup failed
    pub failed: usize,
}

impl Summary {
    /// Total number of queries
    pub fn total(&self) -> usize {
        self.resolved + self.ambiguous + self.not_found + self.failed
    }
}

/// Categorized side reports for one list
///
/// Rows are sorted by case-normalized symbol so the rendered files are
/// byte-identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Name of the list the report describes
    pub list_name: String,
    /// Resolved rows
    pub resolved: Vec<ResolvedRow>,
    /// Ambiguous rows
    pub ambiguous: Vec<AmbiguousRow>,
    /// Not-found rows
    pub not_found: Vec<IssueRow>,
    /// Failed rows
    pub failed: Vec<IssueRow>,
}

impl ResolutionReport {
    /// Per-category counts
    pub fn summary(&self) -> Summary {
        Summary {
            resolved: self.resolved.len(),
            ambiguous: self.ambiguous.len(),
            not_found: self.not_found.len(),
            failed: self.failed.len(),
        }
    }
}

/// Result of ingesting one list
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Unambiguous accessions of the list
    pub set: ProteinSet,
    /// Everything else, categorized
    pub report: ResolutionReport,
}

/// Process-scoped record table shared by every list of a run
#[derive(Debug, Default)]
pub struct Deduplicator {
    records: RwLock<HashMap<String, ProteinRecord>>,
    contributors: RwLock<HashMap<String, BTreeSet<String>>>,
    created: AtomicUsize,
}

impl Deduplicator {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest the results of one list
    pub fn ingest(&self, results: &[ResolutionResult], list_name: &str) -> Ingested {
        self.ingest_from(results, list_name, list_name)
    }

    /// Ingest the results of one list, recording the file it came from
    pub fn ingest_from(
        &self,
        results: &[ResolutionResult],
        list_name: &str,
        source: &str,
    ) -> Ingested {
        let mut report = ResolutionReport {
            list_name: list_name.to_string(),
            ..Default::default()
        };
        let mut members = BTreeSet::new();

        for result in results {
            match result {
                ResolutionResult::Resolved {
                    accession,
                    protein_name,
                    source_symbol,
                    provenance,
                    ..
                } => {
                    if let Some(record) = self.record_for(result) {
                        self.add_contributor(&record.accession, list_name);
                    }
                    members.insert(accession.clone());
                    report.resolved.push(ResolvedRow {
                        symbol: source_symbol.clone(),
                        accession: accession.clone(),
                        protein_name: protein_name.clone(),
                        provenance: *provenance,
                    });
                }
                ResolutionResult::Ambiguous {
                    source_symbol,
                    candidates,
                } => report.ambiguous.push(AmbiguousRow {
                    symbol: source_symbol.clone(),
                    candidates: candidates.clone(),
                }),
                ResolutionResult::NotFound { source_symbol } => report.not_found.push(IssueRow {
                    symbol: source_symbol.clone(),
                    error_kind: "not_found".to_string(),
                    message: "no hits after all query stages".to_string(),
                }),
                ResolutionResult::Failed {
                    source_symbol,
                    error_kind,
                    message,
                    attempts,
                } => report.failed.push(IssueRow {
                    symbol: source_symbol.clone(),
                    error_kind: error_kind.as_str().to_string(),
                    message: format!("{message} (after {attempts} attempt(s))"),
                }),
            }
        }

        sort_report(&mut report);

        let set = ProteinSet::from_accessions(list_name, source, members);
        log::info!(
            "ingested list '{}': {} unique accessions from {} results",
            list_name,
            set.len(),
            results.len()
        );

        Ingested { set, report }
    }

    /// Look up or create the record for a resolved result
    ///
    /// Returns `None` for non-resolved results. Concurrent callers racing on
    /// the same accession end up with one record.
    pub fn record_for(&self, result: &ResolutionResult) -> Option<ProteinRecord> {
        let ResolutionResult::Resolved {
            accession,
            protein_name,
            sequence,
            ..
        } = result
        else {
            return None;
        };

        if let Some(existing) = self.record(accession) {
            if existing.sequence.is_some() || sequence.is_none() {
                return Some(existing);
            }
        }

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records.entry(accession.clone()).or_insert_with(|| {
            self.created.fetch_add(1, Ordering::Relaxed);
            ProteinRecord {
                accession: accession.clone(),
                display_name: protein_name.clone(),
                sequence: None,
            }
        });
        if record.sequence.is_none() {
            record.sequence = sequence.clone();
        }
        Some(record.clone())
    }

    fn add_contributor(&self, accession: &str, list_name: &str) {
        let mut contributors = self
            .contributors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        contributors
            .entry(accession.to_string())
            .or_default()
            .insert(list_name.to_string());
    }

    /// Record for an accession, if one was created
    pub fn record(&self, accession: &str) -> Option<ProteinRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(accession)
            .cloned()
    }

    /// Whether the table holds a record for `accession`
    pub fn contains(&self, accession: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(accession)
    }

    /// All records, sorted by accession
    pub fn records(&self) -> Vec<ProteinRecord> {
        let mut records: Vec<ProteinRecord> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.accession.cmp(&b.accession));
        records
    }

    /// Names of the lists that contributed `accession`, sorted
    pub fn provenance(&self, accession: &str) -> Vec<String> {
        self.contributors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(accession)
            .map(|lists| lists.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of records created so far
    pub fn records_created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Number of records in the table
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sort_report(report: &mut ResolutionReport) {
    let key = |symbol: &str| normalize_symbol(symbol);

    report.resolved.sort_by(|a, b| {
        key(&a.symbol)
            .cmp(&key(&b.symbol))
            .then_with(|| a.cmp(b))
    });
    report.resolved.dedup();

    report.ambiguous.sort_by(|a, b| {
        key(&a.symbol)
            .cmp(&key(&b.symbol))
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.joined_accessions().cmp(&b.joined_accessions()))
    });
    report.ambiguous.dedup();

    for rows in [&mut report.not_found, &mut report.failed] {
        rows.sort_by(|a, b| key(&a.symbol).cmp(&key(&b.symbol)).then_with(|| a.cmp(b)));
        rows.dedup();
    }
}
