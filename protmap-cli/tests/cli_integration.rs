//! Integration tests for the protmap CLI
//!
//! Every run uses the offline fixture service in `tests/fixtures/lookup.json`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn protmap() -> Command {
    let mut cmd = Command::cargo_bin("protmap").unwrap();
    cmd.arg("-q");
    cmd
}

fn prefix(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

fn read_json(path: impl AsRef<Path>) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_resolve_duplicates_and_missing_symbol() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "run");

    protmap()
        .args(["resolve", "-i", &fixture_path("genes.csv"), "-p", &out])
        .args(["--fixtures", &fixture_path("lookup.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "genes: 1 resolved, 0 ambiguous, 1 not found, 0 failed (2 total)",
        ));

    let resolved = fs::read_to_string(format!("{out}_resolved.csv")).unwrap();
    assert_eq!(
        resolved,
        "symbol,accession,protein_name,provenance_flag\nTP53,P04637,Cellular tumor antigen p53,reviewed\n"
    );
    let not_found = fs::read_to_string(format!("{out}_not_found.csv")).unwrap();
    assert!(not_found.contains("NOTAGENE,not_found,"));
    assert_eq!(
        fs::read_to_string(format!("{out}_failed.csv")).unwrap(),
        "symbol,error_kind,message\n"
    );

    let fasta = fs::read_to_string(format!("{out}_resolved.fasta")).unwrap();
    assert!(fasta.starts_with(">P04637 Cellular tumor antigen p53\n"));
}

#[test]
fn test_resolve_tsv_with_split_cells_and_failures() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "screen");

    protmap()
        .args(["--config", &fixture_path("fast_retry.toml")])
        .args(["resolve", "-i", &fixture_path("screen.tsv"), "-p", &out])
        .args(["--column", "gene", "--context-column", "screen", "--split-multi"])
        .args(["--fixtures", &fixture_path("lookup.json"), "--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "screen: 4 resolved, 1 ambiguous, 0 not found, 1 failed (6 total)",
        ));

    let ambiguous = fs::read_to_string(format!("{out}_ambiguous.csv")).unwrap();
    assert!(ambiguous.contains("H2A,Q96QV6;P0C0S8,"));
    let failed = fs::read_to_string(format!("{out}_failed.csv")).unwrap();
    assert!(failed.contains("MYC,timeout,"));
    assert!(failed.contains("(after 2 attempt(s))"));
}

#[test]
fn test_resolve_output_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let first = prefix(&dir, "first");
    let second = prefix(&dir, "second");

    for out in [&first, &second] {
        protmap()
            .args(["--config", &fixture_path("fast_retry.toml")])
            .args(["resolve", "-i", &fixture_path("screen.tsv"), "-p", out])
            .args(["--split-multi", "--fixtures", &fixture_path("lookup.json")])
            .assert()
            .success();
    }

    for kind in ["resolved", "ambiguous", "not_found", "failed"] {
        assert_eq!(
            fs::read(format!("{first}_{kind}.csv")).unwrap(),
            fs::read(format!("{second}_{kind}.csv")).unwrap(),
            "{kind} report differs between runs"
        );
    }
}

#[test]
fn test_missing_column_fails() {
    let dir = TempDir::new().unwrap();

    protmap()
        .args(["resolve", "-i", &fixture_path("genes.csv"), "-p", &prefix(&dir, "run")])
        .args(["--column", "Symbol", "--fixtures", &fixture_path("lookup.json")])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing column 'Symbol'"));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();

    protmap()
        .args(["resolve", "-i", "nonexistent.csv", "-p", &prefix(&dir, "run")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_overlap_of_accession_lists() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "cmp");

    protmap()
        .args(["overlap", "--accessions", "-p", &out])
        .args(["--set", &format!("A={}", fixture_path("set_a.csv"))])
        .args(["--set", &format!("B={}", fixture_path("set_b.csv"))])
        .args(["--set", &format!("C={}", fixture_path("set_c.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("A&B&C"));

    let report = read_json(format!("{out}_overlap_report.json"));
    let regions = report.as_object().unwrap();
    assert_eq!(regions.len(), 7);
    assert_eq!(report["A"]["accessions"], serde_json::json!(["P04637"]));
    assert_eq!(report["B"]["accessions"], serde_json::json!(["P00533"]));
    assert_eq!(report["A&B"]["accessions"], serde_json::json!(["Q00987"]));
    assert_eq!(report["A&B&C"]["accessions"], serde_json::json!(["P38398"]));
    assert_eq!(report["C"]["count"], 0);
    let total: u64 = regions.values().map(|r| r["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 4);

    let summary = read_json(format!("{out}_overlap_summary.json"));
    assert_eq!(summary["union_size"], 4);
}

#[test]
fn test_overlap_keys_ignore_set_order() {
    let dir = TempDir::new().unwrap();
    let forward = prefix(&dir, "forward");
    let reverse = prefix(&dir, "reverse");

    for (out, order) in [(&forward, ["A", "B", "C"]), (&reverse, ["C", "B", "A"])] {
        let mut cmd = protmap();
        cmd.args(["overlap", "--accessions", "-p", out]);
        for name in order {
            let file = fixture_path(&format!("set_{}.csv", name.to_lowercase()));
            cmd.args(["--set", &format!("{name}={file}")]);
        }
        cmd.assert().success();
    }

    let forward = read_json(format!("{forward}_overlap_report.json"));
    let reverse = read_json(format!("{reverse}_overlap_report.json"));
    let mut forward_keys: Vec<&String> = forward.as_object().unwrap().keys().collect();
    let mut reverse_keys: Vec<&String> = reverse.as_object().unwrap().keys().collect();
    forward_keys.sort();
    reverse_keys.sort();
    assert_eq!(forward_keys, reverse_keys);
    assert_eq!(reverse["A&B"]["accessions"], serde_json::json!(["Q00987"]));
    assert_eq!(reverse["A&B&C"]["accessions"], serde_json::json!(["P38398"]));
}

#[test]
fn test_overlap_resolves_symbol_lists() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "lists");

    protmap()
        .args(["--config", &fixture_path("fast_retry.toml")])
        .args(["overlap", "-p", &out, "--split-multi"])
        .args(["--fixtures", &fixture_path("lookup.json")])
        .args(["--set", &format!("genes={}", fixture_path("genes.csv"))])
        .args(["--set", &format!("screen={}", fixture_path("screen.tsv"))])
        .assert()
        .success();

    assert!(Path::new(&format!("{out}_genes_resolved.csv")).exists());
    assert!(Path::new(&format!("{out}_screen_failed.csv")).exists());
    let report = read_json(format!("{out}_overlap_report.json"));
    assert_eq!(report["genes&screen"]["accessions"], serde_json::json!(["P04637"]));
    assert_eq!(report["screen"]["count"], 3);
}

#[test]
fn test_overlap_needs_two_sets() {
    let dir = TempDir::new().unwrap();

    protmap()
        .args(["overlap", "--accessions", "-p", &prefix(&dir, "one")])
        .args(["--set", &format!("A={}", fixture_path("set_a.csv"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least two"));
}

#[test]
fn test_compare_against_reference() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "ref");

    protmap()
        .args(["compare", "--resolved", &fixture_path("targets_resolved.csv")])
        .args(["--reference", &fixture_path("reference.csv"), "-p", &out])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "overlap: 2, reference only: 1, resolved only: 1",
        ));

    let comparison = read_json(format!("{out}_comparison.json"));
    assert_eq!(comparison["overlap"], serde_json::json!(["EGFR", "MDM2"]));
    assert_eq!(comparison["reference_only"], serde_json::json!(["KRAS"]));
    assert_eq!(comparison["resolved_only"], serde_json::json!(["TP53"]));
}

#[test]
fn test_batch_bait_against_targets() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "jobs");

    protmap()
        .args(["batch", "--capacity", "2", "-p", &out])
        .args(["--targets", &fixture_path("targets_resolved.csv")])
        .args(["--bait", "p04637"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 jobs in 2 batches (capacity 2)"));

    let batch_dir = format!("{out}_batches");
    let first = read_json(format!("{batch_dir}/batch_000.json"));
    assert_eq!(
        first,
        serde_json::json!([["P04637", "P00533"], ["P04637", "P04637"]])
    );
    let second = read_json(format!("{batch_dir}/batch_001.json"));
    assert_eq!(second, serde_json::json!([["P04637", "Q00987"]]));
}

#[test]
fn test_batch_from_overlap_region() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "cmp");

    protmap()
        .args(["overlap", "--accessions", "-p", &out])
        .args(["--set", &format!("A={}", fixture_path("set_a.csv"))])
        .args(["--set", &format!("B={}", fixture_path("set_b.csv"))])
        .assert()
        .success();

    protmap()
        .args(["batch", "--capacity", "10", "-p", &out, "--all-pairs"])
        .args(["--from-overlap", &format!("{out}_overlap_report.json")])
        .args(["--region", "B&A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 jobs in 1 batches"));

    let jobs = read_json(format!("{out}_batches/batch_000.json"));
    assert_eq!(jobs, serde_json::json!([["P38398", "Q00987"]]));
}

#[test]
fn test_batch_unknown_bait_fails() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "jobs");

    protmap()
        .args(["batch", "--capacity", "2", "-p", &out])
        .args(["--targets", &fixture_path("targets_resolved.csv")])
        .args(["--bait", "P99999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("P99999"));

    assert!(!Path::new(&format!("{out}_batches")).exists());
}

#[test]
fn test_batch_zero_capacity_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let out = prefix(&dir, "jobs");

    protmap()
        .args(["batch", "--capacity", "0", "-p", &out])
        .args(["--targets", &fixture_path("targets_resolved.csv")])
        .args(["--bait", "P04637"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("capacity"));

    assert!(!Path::new(&format!("{out}_batches")).exists());
}

#[test]
fn test_generate_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("protmap.toml");

    protmap()
        .args(["generate-config", "-o", &path.display().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration template written"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("[resolver]"));
    assert!(text.contains("organism_id = \"9606\""));
    assert!(text.contains("capacity = 30"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[retry]\nmax_attempts = \"many\"\n").unwrap();

    protmap()
        .args(["--config", &path.display().to_string()])
        .args(["compare", "--resolved", &fixture_path("targets_resolved.csv")])
        .args(["--reference", &fixture_path("reference.csv"), "-p", &prefix(&dir, "x")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("protmap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("overlap"))
        .stdout(predicate::str::contains("batch"));
}
