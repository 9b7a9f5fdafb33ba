//! One resolution run across one or more input lists
//!
//! A [`ResolutionSession`] ties the resolver, the worker pool and the record
//! table together. Resolution of a list completes fully before the list is
//! ingested, so everything downstream (sets, batches, overlap) works on a
//! finished snapshot.

use crate::backoff::BackoffPolicy;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::lookup::LookupService;
use crate::pool::WorkerPool;
use crate::resolver::Resolver;
use protmap_core::{unique_queries, Deduplicator, GeneQuery, Ingested, ResolutionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Lookup counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Queries sent through the resolver
    pub resolved_remotely: usize,
    /// Queries answered from the symbol memo
    pub memo_hits: usize,
}

/// Resolution state scoped to one run
#[derive(Debug)]
pub struct ResolutionSession {
    resolver: Resolver,
    pool: WorkerPool,
    dedup: Deduplicator,
    memo: RwLock<HashMap<String, ResolutionResult>>,
    resolved_remotely: AtomicUsize,
    memo_hits: AtomicUsize,
}

impl ResolutionSession {
    /// Create a session from parts
    pub fn new(resolver: Resolver, pool: WorkerPool) -> Self {
        Self {
            resolver,
            pool,
            dedup: Deduplicator::new(),
            memo: RwLock::new(HashMap::new()),
            resolved_remotely: AtomicUsize::new(0),
            memo_hits: AtomicUsize::new(0),
        }
    }

    /// Create a session from configuration and a lookup service
    pub fn from_config(config: &EngineConfig, service: Arc<dyn LookupService>) -> Result<Self> {
        config.validate()?;
        let resolver = Resolver::new(
            service,
            config.resolver.clone(),
            BackoffPolicy::from(&config.retry),
        );
        let pool = WorkerPool::new(config.max_concurrency)?;
        log::info!(
            "resolution session: {} worker(s), organism {}",
            pool.threads(),
            config.resolver.organism_id
        );
        Ok(Self::new(resolver, pool))
    }

    /// The record table shared by every list of this session
    pub fn dedup(&self) -> &Deduplicator {
        &self.dedup
    }

    /// The resolver
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Lookup counters so far
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            resolved_remotely: self.resolved_remotely.load(Ordering::Relaxed),
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
        }
    }

    /// Resolve a list of queries
    ///
    /// Queries are collapsed by case-normalized symbol first; the returned
    /// results are sorted by that key, one per distinct symbol.
    pub fn resolve_all(&self, queries: &[GeneQuery]) -> Vec<ResolutionResult> {
        self.resolve_all_with_progress(queries, || {})
    }

    /// Resolve a list of queries, calling `on_done` once per distinct query
    pub fn resolve_all_with_progress<F>(
        &self,
        queries: &[GeneQuery],
        on_done: F,
    ) -> Vec<ResolutionResult>
    where
        F: Fn() + Sync + Send,
    {
        let unique = unique_queries(queries);
        log::debug!(
            "{} queries, {} distinct symbols",
            queries.len(),
            unique.len()
        );

        self.pool.map(&unique, |query| {
            let result = self.resolve_one(query);
            on_done();
            result
        })
    }

    /// Number of distinct queries `resolve_all` will process
    pub fn distinct_count(queries: &[GeneQuery]) -> usize {
        unique_queries(queries).len()
    }

    fn resolve_one(&self, query: &GeneQuery) -> ResolutionResult {
        let key = query.key();
        let cached = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(cached) = cached {
            self.memo_hits.fetch_add(1, Ordering::Relaxed);
            return with_source_symbol(cached, &query.symbol);
        }

        self.resolved_remotely.fetch_add(1, Ordering::Relaxed);
        let result = self.resolver.resolve_default(query);
        if result.is_terminal() {
            self.memo
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert_with(|| result.clone());
        }
        result
    }

    /// Resolve one list and ingest it into the record table
    pub fn resolve_list(&self, queries: &[GeneQuery], list_name: &str, source: &str) -> Ingested {
        self.resolve_list_with_progress(queries, list_name, source, || {})
    }

    /// [`resolve_list`](Self::resolve_list) with a per-query callback
    pub fn resolve_list_with_progress<F>(
        &self,
        queries: &[GeneQuery],
        list_name: &str,
        source: &str,
        on_done: F,
    ) -> Ingested
    where
        F: Fn() + Sync + Send,
    {
        let results = self.resolve_all_with_progress(queries, on_done);
        self.dedup.ingest_from(&results, list_name, source)
    }
}

fn with_source_symbol(result: ResolutionResult, symbol: &str) -> ResolutionResult {
    let symbol = symbol.to_string();
    match result {
        ResolutionResult::Resolved {
            accession,
            protein_name,
            provenance,
            sequence,
            ..
        } => ResolutionResult::Resolved {
            accession,
            protein_name,
            source_symbol: symbol,
            provenance,
            sequence,
        },
        ResolutionResult::Ambiguous { candidates, .. } => ResolutionResult::Ambiguous {
            source_symbol: symbol,
            candidates,
        },
        ResolutionResult::NotFound { .. } => ResolutionResult::NotFound {
            source_symbol: symbol,
        },
        ResolutionResult::Failed {
            error_kind,
            message,
            attempts,
            ..
        } => ResolutionResult::Failed {
            source_symbol: symbol,
            error_kind,
            message,
            attempts,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{MockLookup, MockRecord};
    use protmap_core::ErrorKind;

    fn session(mock: Arc<MockLookup>, threads: usize) -> ResolutionSession {
        let config = EngineConfig {
            max_concurrency: threads,
            ..EngineConfig::offline()
        };
        ResolutionSession::from_config(&config, mock).unwrap()
    }

    fn queries(symbols: &[&str]) -> Vec<GeneQuery> {
        symbols.iter().map(GeneQuery::new).collect()
    }

    #[test]
    fn test_tp53_twice_and_unknown_gene() {
        let mock = Arc::new(
            MockLookup::new().with_record(MockRecord::reviewed("P04637", "p53", &["TP53"])),
        );
        let session = session(mock.clone(), 2);

        let ingested = session.resolve_list(&queries(&["TP53", "TP53", "NOTAGENE"]), "screen", "screen.csv");
        assert_eq!(ingested.set.as_slice(), ["P04637"]);
        assert_eq!(ingested.report.not_found[0].symbol, "NOTAGENE");
        assert_eq!(ingested.set.source(), "screen.csv");
        assert_eq!(mock.calls_for("TP53"), 1);
    }

    #[test]
    fn test_memo_spans_lists() {
        let mock = Arc::new(
            MockLookup::new().with_record(MockRecord::reviewed("P04637", "p53", &["TP53"])),
        );
        let session = session(mock.clone(), 1);

        session.resolve_list(&queries(&["TP53"]), "dna", "dna.csv");
        let rna = session.resolve_list(&queries(&["tp53"]), "rna", "rna.csv");

        assert_eq!(mock.calls_for("TP53"), 1);
        assert_eq!(rna.report.resolved[0].symbol, "tp53");
        assert_eq!(
            session.stats(),
            SessionStats {
                resolved_remotely: 1,
                memo_hits: 1
            }
        );
        assert_eq!(session.dedup().provenance("P04637"), vec!["dna", "rna"]);
    }

    #[test]
    fn test_failures_are_not_memoized() {
        let mock = Arc::new(
            MockLookup::new()
                .with_record(MockRecord::reviewed("P01106", "Myc proto-oncogene protein", &["MYC"]))
                .with_failure("MYC", ErrorKind::Timeout, Some(3)),
        );
        let session = session(mock.clone(), 1);

        let first = session.resolve_all(&queries(&["MYC"]));
        assert!(matches!(first[0], ResolutionResult::Failed { attempts: 3, .. }));

        let second = session.resolve_all(&queries(&["MYC"]));
        assert_eq!(second[0].accession(), Some("P01106"));
    }

    #[test]
    fn test_results_independent_of_concurrency_and_order() {
        let mock = || {
            Arc::new(
                MockLookup::new()
                    .with_record(MockRecord::reviewed("P04637", "p53", &["TP53"]))
                    .with_record(MockRecord::reviewed("P38398", "BRCA1", &["BRCA1"]))
                    .with_record(MockRecord::reviewed("P51587", "BRCA2", &["BRCA2"])),
            )
        };
        let forward = queries(&["TP53", "BRCA1", "BRCA2", "NOPE", "brca1"]);
        let mut backward = forward.clone();
        backward.reverse();

        let a = session(mock(), 1).resolve_list(&forward, "list", "list.csv");
        let b = session(mock(), 4).resolve_list(&backward, "list", "list.csv");
        assert_eq!(a.set, b.set);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn test_progress_callback_counts_distinct_queries() {
        let mock = Arc::new(MockLookup::new());
        let session = session(mock, 2);
        let done = AtomicUsize::new(0);
        let list = queries(&["A1", "a1", "B2"]);

        session.resolve_all_with_progress(&list, || {
            done.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(done.load(Ordering::Relaxed), 2);
        assert_eq!(ResolutionSession::distinct_count(&list), 2);
    }
}
