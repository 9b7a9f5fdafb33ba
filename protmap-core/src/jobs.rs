//! Jobs: ordered tuples of accessions for downstream prediction

use crate::error::{CoreError, Result};
use crate::set::ProteinSet;
use serde::{Deserialize, Serialize};

/// One unit of downstream work, e.g. a bait × target pair
///
/// Serializes as a plain JSON array of accessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job(Vec<String>);

impl Job {
    /// Create a job from an ordered list of accessions
    pub fn new<I, S>(accessions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(accessions.into_iter().map(Into::into).collect())
    }

    /// Two-member job
    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(vec![first.into(), second.into()])
    }

    /// Accessions in job order
    pub fn accessions(&self) -> &[String] {
        &self.0
    }

    /// Number of accessions in the job
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the job has no accessions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pair every bait with every target, bait-major
pub fn bait_vs_targets(baits: &[String], targets: &ProteinSet) -> Vec<Job> {
    baits
        .iter()
        .flat_map(|bait| targets.iter().map(move |target| Job::pair(bait.clone(), target)))
        .collect()
}

/// Every unordered pair of distinct members, in set order
pub fn all_pairs(set: &ProteinSet) -> Vec<Job> {
    let members = set.as_slice();
    let mut jobs = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
    for (i, first) in members.iter().enumerate() {
        for second in &members[i + 1..] {
            jobs.push(Job::pair(first.clone(), second.clone()));
        }
    }
    jobs
}

/// Check that every job is non-empty and only names known accessions
pub fn validate_jobs<F>(jobs: &[Job], is_known: F) -> Result<()>
where
    F: Fn(&str) -> bool,
{
    for (job_index, job) in jobs.iter().enumerate() {
        if job.is_empty() {
            return Err(CoreError::EmptyJob { job_index });
        }
        if let Some(accession) = job.accessions().iter().find(|a| !is_known(a)) {
            return Err(CoreError::UnknownAccession {
                job_index,
                accession: accession.clone(),
            });
        }
    }
    Ok(())
}
