//! Property tests for partitioning, overlap regions and deduplication

use proptest::prelude::*;
use protmap_core::*;
use std::collections::BTreeSet;

fn job_list(len: usize) -> Vec<Job> {
    (0..len).map(|i| Job::pair("BAIT", format!("T{i}"))).collect()
}

fn accession_sets() -> impl Strategy<Value = Vec<BTreeSet<u8>>> {
    prop::collection::vec(prop::collection::btree_set(0u8..40, 0..25), 1..6)
}

proptest! {
    #[test]
    fn partition_is_complete_and_bounded(len in 0usize..500, capacity in 1usize..64) {
        let jobs = job_list(len);
        let batches = partition(&jobs, capacity).unwrap();

        prop_assert_eq!(batches.len(), len.div_ceil(capacity));

        let concatenated: Vec<Job> = batches.iter().flat_map(|b| b.jobs.clone()).collect();
        prop_assert_eq!(&concatenated, &jobs);

        for (k, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, k);
            prop_assert!(batch.len() <= capacity);
            if k + 1 < batches.len() {
                prop_assert_eq!(batch.len(), capacity);
            }
        }
    }

    #[test]
    fn partition_is_reproducible(len in 0usize..200, capacity in 1usize..32) {
        let jobs = job_list(len);
        prop_assert_eq!(partition(&jobs, capacity).unwrap(), partition(&jobs, capacity).unwrap());
    }

    #[test]
    fn overlap_regions_partition_the_union(raw in accession_sets()) {
        let sets: Vec<ProteinSet> = raw
            .iter()
            .enumerate()
            .map(|(i, members)| {
                ProteinSet::from_accessions(format!("set{i}"), "", members.iter().map(|m| format!("P{m:05}")))
            })
            .collect();
        let report = compute_overlap(&sets).unwrap();

        let union: BTreeSet<String> = sets.iter().flat_map(|s| s.iter().map(str::to_string)).collect();
        prop_assert_eq!(report.regions().len(), (1usize << sets.len()) - 1);
        prop_assert_eq!(report.total(), union.len());

        for set in &sets {
            prop_assert_eq!(report.containing(set.name()), Some(set.len()));
        }

        // Every accession appears in exactly one region, the one matching its membership
        let mut seen = BTreeSet::new();
        for region in report.regions() {
            for accession in &region.accessions {
                prop_assert!(seen.insert(accession.clone()));
                for (i, set) in sets.iter().enumerate() {
                    prop_assert_eq!(set.contains(accession), region.includes(i));
                }
            }
        }
    }

    #[test]
    fn ingest_is_order_independent(raw in prop::collection::vec((0u8..10, 0u8..6), 0..30)) {
        let results: Vec<ResolutionResult> = raw
            .iter()
            .map(|(symbol, accession)| ResolutionResult::Resolved {
                accession: format!("P{accession:05}"),
                protein_name: format!("protein {accession}"),
                source_symbol: format!("GENE{symbol}"),
                provenance: Provenance::Reviewed,
                sequence: None,
            })
            .collect();
        let mut reversed = results.clone();
        reversed.reverse();

        let forward = Deduplicator::new().ingest(&results, "list");
        let backward = Deduplicator::new().ingest(&reversed, "list");

        prop_assert_eq!(forward.set.as_slice(), backward.set.as_slice());
        prop_assert_eq!(forward.report, backward.report);
    }
}
