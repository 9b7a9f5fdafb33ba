//! Deterministic batch partitioning
//!
//! Batch `k` holds jobs `[k * capacity, min((k + 1) * capacity, len))`.
//! Concatenating the batches in index order reproduces the job list exactly.

use crate::error::{CoreError, Result};
use crate::jobs::Job;
use serde::Serialize;
use std::num::NonZeroUsize;

/// A capacity-bounded, ordered slice of a job list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    /// Zero-based sequence index
    pub index: usize,
    /// Jobs in original order
    pub jobs: Vec<Job>,
}

impl Batch {
    /// File name used when the batch is written to disk
    pub fn file_name(&self) -> String {
        format!("batch_{:03}.json", self.index)
    }

    /// Number of jobs in the batch
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the batch holds no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Splits job lists into fixed-capacity batches
#[derive(Debug, Clone, Copy)]
pub struct BatchPartitioner {
    capacity: NonZeroUsize,
}

impl BatchPartitioner {
    /// Create a partitioner, rejecting a zero capacity
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(|capacity| Self { capacity })
            .ok_or(CoreError::InvalidCapacity { capacity })
    }

    /// Per-batch quota
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of batches `partition` will produce for `job_count` jobs
    pub fn batch_count(&self, job_count: usize) -> usize {
        job_count.div_ceil(self.capacity.get())
    }

    /// Split `jobs` into batches; an empty list yields no batches
    pub fn partition(&self, jobs: &[Job]) -> Vec<Batch> {
        jobs.chunks(self.capacity.get())
            .enumerate()
            .map(|(index, chunk)| Batch {
                index,
                jobs: chunk.to_vec(),
            })
            .collect()
    }
}

/// Validate `capacity` and partition `jobs` in one step
pub fn partition(jobs: &[Job], capacity: usize) -> Result<Vec<Batch>> {
    Ok(BatchPartitioner::new(capacity)?.partition(jobs))
}

/// Concatenate batches back into one job list
pub fn flatten(batches: &[Batch]) -> Vec<Job> {
    batches.iter().flat_map(|b| b.jobs.iter().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(count: usize) -> Vec<Job> {
        (0..count)
            .map(|i| Job::pair("Q04740", format!("P{i:05}")))
            .collect()
    }

    #[test]
    fn test_ninety_five_by_thirty() {
        let batches = partition(&jobs(95), 30).unwrap();
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![30, 30, 30, 5]);
        assert_eq!(flatten(&batches), jobs(95));
    }

    #[test]
    fn test_exact_multiple() {
        let batches = partition(&jobs(60), 30).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 30));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(
            partition(&jobs(5), 0),
            Err(CoreError::InvalidCapacity { capacity: 0 })
        );
        assert!(BatchPartitioner::new(0).is_err());
    }

    #[test]
    fn test_empty_job_list_yields_no_batches() {
        let batches = partition(&[], 10).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_batch_indices_and_file_names() {
        let batches = partition(&jobs(7), 3).unwrap();
        let names: Vec<String> = batches.iter().map(Batch::file_name).collect();
        assert_eq!(names, vec!["batch_000.json", "batch_001.json", "batch_002.json"]);
        assert_eq!(batches[2].index, 2);
    }

    #[test]
    fn test_batch_count_matches_partition() {
        let partitioner = BatchPartitioner::new(4).unwrap();
        for len in 0..20 {
            assert_eq!(partitioner.batch_count(len), partitioner.partition(&jobs(len)).len());
        }
    }
}
