//! End-to-end scenarios over the domain layer

use protmap_core::*;

fn reviewed(symbol: &str, accession: &str, name: &str) -> ResolutionResult {
    ResolutionResult::Resolved {
        accession: accession.to_string(),
        protein_name: name.to_string(),
        source_symbol: symbol.to_string(),
        provenance: Provenance::Reviewed,
        sequence: None,
    }
}

#[test]
fn test_duplicate_symbol_and_unknown_gene() {
    let results = vec![
        reviewed("TP53", "P04637", "Cellular tumor antigen p53"),
        reviewed("TP53", "P04637", "Cellular tumor antigen p53"),
        ResolutionResult::NotFound {
            source_symbol: "NOTAGENE".to_string(),
        },
    ];

    let dedup = Deduplicator::new();
    let ingested = dedup.ingest(&results, "screen");

    assert_eq!(ingested.set.as_slice(), ["P04637"]);
    let not_found: Vec<&str> = ingested
        .report
        .not_found
        .iter()
        .map(|r| r.symbol.as_str())
        .collect();
    assert_eq!(not_found, vec!["NOTAGENE"]);
    assert_eq!(ingested.report.summary().total(), 2);
}

#[test]
fn test_ambiguous_symbol_never_resolves() {
    let results = vec![ResolutionResult::Ambiguous {
        source_symbol: "HIST1".to_string(),
        candidates: vec![
            Candidate {
                accession: "P0C0S8".to_string(),
                protein_name: "Histone H2A type 1".to_string(),
            },
            Candidate {
                accession: "Q96QV6".to_string(),
                protein_name: "Histone H2A type 1-A".to_string(),
            },
        ],
    }];

    let ingested = Deduplicator::new().ingest(&results, "screen");
    assert!(ingested.set.is_empty());
    assert!(ingested.report.resolved.is_empty());
    assert_eq!(ingested.report.ambiguous.len(), 1);
    assert_eq!(ingested.report.ambiguous[0].candidates.len(), 2);
}

#[test]
fn test_lists_to_overlap_to_batches() {
    let dedup = Deduplicator::new();
    let dna = dedup.ingest(
        &[
            reviewed("TP53", "P04637", "p53"),
            reviewed("RNH1", "P13489", "Ribonuclease inhibitor"),
            reviewed("DICER1", "Q9UPY3", "Endoribonuclease Dicer"),
        ],
        "dna",
    );
    let rna = dedup.ingest(
        &[
            reviewed("DICER1", "Q9UPY3", "Endoribonuclease Dicer"),
            reviewed("RNH1", "P13489", "Ribonuclease inhibitor"),
        ],
        "rna",
    );

    let report = compute_overlap(&[dna.set.clone(), rna.set.clone()]).unwrap();
    let shared = report.region(&["dna", "rna"]).unwrap();
    assert_eq!(shared.accessions, vec!["P13489", "Q9UPY3"]);
    assert_eq!(dedup.provenance("Q9UPY3"), vec!["dna", "rna"]);

    let targets = ProteinSet::from_accessions("shared", "overlap", shared.accessions.clone());
    let jobs = bait_vs_targets(&["P04637".to_string()], &targets);
    validate_jobs(&jobs, |a| dedup.contains(a)).unwrap();

    let batches = partition(&jobs, 1).unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].jobs[0], Job::pair("P04637", "P13489"));
}

#[test]
fn test_jobs_with_unresolved_accession_are_rejected() {
    let dedup = Deduplicator::new();
    dedup.ingest(&[reviewed("TP53", "P04637", "p53")], "list");

    let jobs = vec![Job::pair("P04637", "Q04740")];
    let err = validate_jobs(&jobs, |a| dedup.contains(a)).unwrap_err();
    assert!(matches!(err, CoreError::UnknownAccession { ref accession, .. } if accession == "Q04740"));
}

#[test]
fn test_capacity_zero_is_fatal() {
    let jobs = vec![Job::pair("A", "B")];
    assert!(matches!(
        partition(&jobs, 0),
        Err(CoreError::InvalidCapacity { capacity: 0 })
    ));
}
