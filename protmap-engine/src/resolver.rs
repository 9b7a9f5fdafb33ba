//! Symbol resolution with an ordered fallback chain
//!
//! Stages, each tried only while no usable answer exists:
//!
//! 1. strict search (exact symbol, organism, reviewed records)
//! 2. direct fetch when the token looks like an accession
//! 3. relaxed search without the reviewed filter, when enabled
//!
//! Every network call goes through the shared [`BackoffPolicy`]. A call that
//! still fails after its budget turns into [`ResolutionResult::Failed`].

use crate::backoff::{BackoffPolicy, Exhausted};
use crate::config::ResolverConfig;
use crate::lookup::{Hit, LookupService, SearchQuery};
use protmap_core::accession::canonical_accession;
use protmap_core::{GeneQuery, Provenance, ResolutionResult};
use std::sync::Arc;

/// Resolves one [`GeneQuery`] at a time
///
/// Holds no mutable state; one resolver is shared by every worker of a run.
#[derive(Clone)]
pub struct Resolver {
    service: Arc<dyn LookupService>,
    config: ResolverConfig,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("service", &self.service.name())
            .field("config", &self.config)
            .field("backoff", &self.backoff)
            .finish()
    }
}

enum Strict {
    Hits(Vec<Hit>),
    Failed(Exhausted),
}

impl Resolver {
    /// Create a resolver
    pub fn new(
        service: Arc<dyn LookupService>,
        config: ResolverConfig,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            service,
            config,
            backoff,
        }
    }

    /// Resolver settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve against the configured organism
    pub fn resolve_default(&self, query: &GeneQuery) -> ResolutionResult {
        self.resolve(query, &self.config.organism_id)
    }

    /// Resolve one query
    pub fn resolve(&self, query: &GeneQuery, organism: &str) -> ResolutionResult {
        let symbol = query.symbol.as_str();
        log::debug!("resolving '{}' (organism {})", symbol, organism);

        // Stage 1: strict search
        let strict = match self.search(SearchQuery::strict(symbol, organism)) {
            Ok(mut hits) if hits.len() == 1 => {
                log::debug!("'{}': single reviewed hit", symbol);
                return resolved(symbol, hits.remove(0), Provenance::Reviewed);
            }
            Ok(hits) => Strict::Hits(hits),
            Err(exhausted) => Strict::Failed(exhausted),
        };

        // Stage 2: direct fetch for accession-shaped tokens
        if let Some(accession) = self.passthrough_candidate(symbol) {
            log::debug!("'{}': trying direct fetch of {}", symbol, accession);
            match self.backoff.retry(|_| self.service.fetch(&accession)) {
                Ok(Some(hit)) => {
                    return resolved(symbol, hit, Provenance::AccessionPassthrough);
                }
                Ok(None) => log::debug!("'{}': no record for {}", symbol, accession),
                Err(exhausted) => {
                    if let Strict::Hits(hits) = &strict {
                        if hits.is_empty() {
                            return failed(symbol, exhausted);
                        }
                    }
                }
            }
        }

        let hits = match strict {
            Strict::Failed(exhausted) => return failed(symbol, exhausted),
            Strict::Hits(hits) => hits,
        };
        if hits.len() > 1 {
            log::debug!("'{}': {} reviewed hits, ambiguous", symbol, hits.len());
            return ambiguous(symbol, &hits);
        }

        // Stage 3: relaxed search
        if self.config.allow_unreviewed_fallback {
            log::debug!("'{}': trying unreviewed fallback", symbol);
            return match self.search(SearchQuery::relaxed(symbol, organism)) {
                Ok(mut hits) if hits.len() == 1 => {
                    resolved(symbol, hits.remove(0), Provenance::UnreviewedFallback)
                }
                Ok(hits) if hits.len() > 1 => ambiguous(symbol, &hits),
                Ok(_) => not_found(symbol),
                Err(exhausted) => failed(symbol, exhausted),
            };
        }

        not_found(symbol)
    }

    fn search(&self, query: SearchQuery) -> Result<Vec<Hit>, Exhausted> {
        self.backoff.retry(|_| self.service.search(&query))
    }

    fn passthrough_candidate(&self, token: &str) -> Option<String> {
        if self.config.passthrough_accessions {
            canonical_accession(token)
        } else {
            None
        }
    }
}

fn resolved(symbol: &str, hit: Hit, provenance: Provenance) -> ResolutionResult {
    ResolutionResult::Resolved {
        accession: hit.accession,
        protein_name: hit.protein_name,
        source_symbol: symbol.to_string(),
        provenance,
        sequence: hit.sequence,
    }
}

fn ambiguous(symbol: &str, hits: &[Hit]) -> ResolutionResult {
    ResolutionResult::Ambiguous {
        source_symbol: symbol.to_string(),
        candidates: hits.iter().map(Hit::to_candidate).collect(),
    }
}

fn not_found(symbol: &str) -> ResolutionResult {
    log::debug!("'{}': no hits after all stages", symbol);
    ResolutionResult::NotFound {
        source_symbol: symbol.to_string(),
    }
}

fn failed(symbol: &str, exhausted: Exhausted) -> ResolutionResult {
    log::warn!(
        "'{}': lookup failed after {} attempt(s): {}",
        symbol,
        exhausted.attempts,
        exhausted.last
    );
    ResolutionResult::Failed {
        source_symbol: symbol.to_string(),
        error_kind: exhausted.last.kind,
        message: exhausted.last.message,
        attempts: exhausted.attempts,
    }
}
