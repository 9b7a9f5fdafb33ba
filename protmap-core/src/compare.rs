//! Comparison of a resolved list against an external reference list
//!
//! A two-set case of the overlap engine. The reference is typically keyed by
//! gene symbol rather than accession, so the join key is configurable and all
//! keys are case-normalized before comparison.

use crate::dedup::ResolvedRow;
use crate::error::Result;
use crate::overlap::compute_overlap;
use crate::set::ProteinSet;
use crate::types::normalize_symbol;
use serde::Serialize;

/// Which field of a resolved row is compared against the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKey {
    /// Compare queried symbols
    #[default]
    Symbol,
    /// Compare resolved accessions
    Accession,
}

/// Outcome of a reference comparison, every list sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceComparison {
    /// Keys present on both sides
    pub overlap: Vec<String>,
    /// Keys only in the reference list
    pub reference_only: Vec<String>,
    /// Keys only in the resolved list
    pub resolved_only: Vec<String>,
}

const RESOLVED: &str = "resolved";
const REFERENCE: &str = "reference";

/// Compare resolved rows against reference keys
pub fn compare_with_reference<I, S>(
    resolved: &[ResolvedRow],
    reference: I,
    join: JoinKey,
) -> Result<ReferenceComparison>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let resolved_keys = resolved.iter().map(|row| match join {
        JoinKey::Symbol => normalize_symbol(&row.symbol),
        JoinKey::Accession => normalize_symbol(&row.accession),
    });
    let reference_keys = reference
        .into_iter()
        .map(|key| normalize_symbol(key.as_ref()))
        .filter(|key| !key.is_empty());

    let sets = [
        ProteinSet::from_accessions(RESOLVED, RESOLVED, resolved_keys),
        ProteinSet::from_accessions(REFERENCE, REFERENCE, reference_keys),
    ];
    let report = compute_overlap(&sets)?;

    let region = |names: &[&str]| {
        report
            .region(names)
            .map(|r| r.accessions.clone())
            .unwrap_or_default()
    };

    Ok(ReferenceComparison {
        overlap: region(&[RESOLVED, REFERENCE]),
        reference_only: region(&[REFERENCE]),
        resolved_only: region(&[RESOLVED]),
    })
}
