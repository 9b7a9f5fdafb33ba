//! Exact N-way overlap regions
//!
//! For N named sets every one of the `2^N - 1` non-empty index subsets gets a
//! region holding the accessions that belong to exactly those sets and no
//! others. Each accession of the union lands in exactly one region, so region
//! counts always sum to the union size and the counts of the regions
//! containing a set sum to that set's size.
//!
//! Regions are ordered by subset size, then by index tuple, e.g. for three
//! sets: `{0} {1} {2} {0,1} {0,2} {1,2} {0,1,2}`.

use crate::error::{CoreError, Result};
use crate::set::ProteinSet;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Maximum number of sets accepted (65 535 regions)
pub const MAX_SETS: usize = 16;

/// Separator between set names in a region key
pub const KEY_SEPARATOR: char = '&';

/// Accessions belonging to exactly one combination of sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Member set indices, ascending
    pub members: Vec<usize>,
    /// Member set names, in index order
    pub names: Vec<String>,
    /// Sorted accessions
    pub accessions: Vec<String>,
}

impl Region {
    /// Canonical key: member names, sorted, joined with `&`
    ///
    /// Independent of the order the sets were given in.
    pub fn key(&self) -> String {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.join(&KEY_SEPARATOR.to_string())
    }

    /// Number of accessions in the region
    pub fn count(&self) -> usize {
        self.accessions.len()
    }

    /// Whether set `index` is a member of this region
    pub fn includes(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Region", 2)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("accessions", &self.accessions)?;
        state.end()
    }
}

/// Two-set statistics for one pair of sets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseStats {
    /// First set name
    pub first: String,
    /// Second set name
    pub second: String,
    /// `|A ∩ B|`
    pub intersection: usize,
    /// `|A ∪ B|`
    pub union: usize,
    /// `|A ∩ B| / |A ∪ B|`, 0 when both are empty
    pub jaccard: f64,
    /// `|A ∩ B| / |A|` as a percentage, 0 when A is empty
    pub overlap_pct_first: f64,
    /// `|A ∩ B| / |B|` as a percentage, 0 when B is empty
    pub overlap_pct_second: f64,
}

/// Per-set size entry of an [`OverlapSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSize {
    /// Set name
    pub name: String,
    /// Number of accessions
    pub size: usize,
}

/// Size and pairwise information accompanying an overlap report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapSummary {
    /// Input sets in index order
    pub sets: Vec<SetSize>,
    /// Size of the union of all sets
    pub union_size: usize,
    /// One entry per unordered pair, in index order
    pub pairwise: Vec<PairwiseStats>,
}

/// Inclusion-exclusion partition of N named sets
///
/// Serializes as a JSON object from region key to `{count, accessions}`, in
/// canonical region order.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    set_names: Vec<String>,
    set_sizes: Vec<usize>,
    regions: Vec<Region>,
    pairwise: Vec<PairwiseStats>,
}

impl OverlapReport {
    /// Set names in index order
    pub fn set_names(&self) -> &[String] {
        &self.set_names
    }

    /// All regions in canonical order, including empty ones
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Pairwise statistics, in index order
    pub fn pairwise(&self) -> &[PairwiseStats] {
        &self.pairwise
    }

    /// Region whose members are exactly `names`, in any order
    pub fn region(&self, names: &[&str]) -> Option<&Region> {
        let wanted: BTreeSet<&str> = names.iter().copied().collect();
        self.regions.iter().find(|region| {
            region.names.len() == wanted.len()
                && region.names.iter().all(|n| wanted.contains(n.as_str()))
        })
    }

    /// Region with the given canonical key
    pub fn region_by_key(&self, key: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.key() == key)
    }

    /// Sum of all region counts; equals the union size
    pub fn total(&self) -> usize {
        self.regions.iter().map(Region::count).sum()
    }

    /// Sum of the counts of every region that includes set `name`
    pub fn containing(&self, name: &str) -> Option<usize> {
        let index = self.set_names.iter().position(|n| n == name)?;
        Some(
            self.regions
                .iter()
                .filter(|r| r.includes(index))
                .map(Region::count)
                .sum(),
        )
    }

    /// Sizes and pairwise statistics
    pub fn summary(&self) -> OverlapSummary {
        OverlapSummary {
            sets: self
                .set_names
                .iter()
                .zip(&self.set_sizes)
                .map(|(name, size)| SetSize {
                    name: name.clone(),
                    size: *size,
                })
                .collect(),
            union_size: self.total(),
            pairwise: self.pairwise.clone(),
        }
    }
}

impl Serialize for OverlapReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.regions.len()))?;
        for region in &self.regions {
            map.serialize_entry(&region.key(), region)?;
        }
        map.end()
    }
}

/// Compute every exclusive region of `sets`
///
/// Set names must be unique, non-empty and free of the `&` key separator.
pub fn compute_overlap(sets: &[ProteinSet]) -> Result<OverlapReport> {
    validate_sets(sets)?;

    let mut masks: HashMap<&str, u32> = HashMap::new();
    for (index, set) in sets.iter().enumerate() {
        for accession in set.iter() {
            *masks.entry(accession).or_insert(0) |= 1 << index;
        }
    }

    let mut by_mask: HashMap<u32, Vec<String>> = HashMap::new();
    for (accession, mask) in masks {
        by_mask.entry(mask).or_default().push(accession.to_string());
    }

    let set_names: Vec<String> = sets.iter().map(|s| s.name().to_string()).collect();
    let regions = canonical_subsets(sets.len())
        .into_iter()
        .map(|members| {
            let mask = members.iter().fold(0u32, |acc, i| acc | (1 << i));
            let mut accessions = by_mask.remove(&mask).unwrap_or_default();
            accessions.sort();
            Region {
                names: members.iter().map(|&i| set_names[i].clone()).collect(),
                members,
                accessions,
            }
        })
        .collect();

    Ok(OverlapReport {
        set_sizes: sets.iter().map(ProteinSet::len).collect(),
        pairwise: pairwise_stats(sets),
        set_names,
        regions,
    })
}

fn validate_sets(sets: &[ProteinSet]) -> Result<()> {
    if sets.is_empty() {
        return Err(CoreError::NoSets);
    }
    if sets.len() > MAX_SETS {
        return Err(CoreError::TooManySets {
            count: sets.len(),
            max: MAX_SETS,
        });
    }

    let mut seen = HashSet::new();
    for set in sets {
        let name = set.name();
        if name.trim().is_empty() || name.contains(KEY_SEPARATOR) {
            return Err(CoreError::InvalidSetName {
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(CoreError::DuplicateSetName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Every non-empty subset of `0..n`, by size then lexicographic index tuple
fn canonical_subsets(n: usize) -> Vec<Vec<usize>> {
    let mut subsets = Vec::with_capacity((1usize << n).saturating_sub(1));
    for size in 1..=n {
        let mut combo: Vec<usize> = (0..size).collect();
        loop {
            subsets.push(combo.clone());

            // Advance to the next combination in lexicographic order
            let Some(pivot) = (0..size).rev().find(|&i| combo[i] < n - size + i) else {
                break;
            };
            combo[pivot] += 1;
            for i in pivot + 1..size {
                combo[i] = combo[i - 1] + 1;
            }
        }
    }
    subsets
}

fn pairwise_stats(sets: &[ProteinSet]) -> Vec<PairwiseStats> {
    let mut stats = Vec::new();
    for (i, first) in sets.iter().enumerate() {
        for second in &sets[i + 1..] {
            let intersection = first.iter().filter(|a| second.contains(a)).count();
            let union = first.len() + second.len() - intersection;
            stats.push(PairwiseStats {
                first: first.name().to_string(),
                second: second.name().to_string(),
                intersection,
                union,
                jaccard: ratio(intersection, union),
                overlap_pct_first: ratio(intersection, first.len()) * 100.0,
                overlap_pct_second: ratio(intersection, second.len()) * 100.0,
            });
        }
    }
    stats
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
