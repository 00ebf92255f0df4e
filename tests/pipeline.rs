//! End-to-end pipeline tests: prepare -> bench -> verify against a scripted
//! stand-in engine.
//!
//! The stand-in reads the query file it is handed, answers every `find-path`
//! line deterministically, and emits the timing/iteration lines the metrics
//! extractor expects. A "buggy" variant answers differently for the smart
//! strategy's workload, which the verify suite must catch.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::str::contains;

const THREE_EDGE_GRAPH: &str = "1 a 2\n2 b 3\n1 a 3\n";

fn write_engine(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Engine that answers "no path" for every query, identically per strategy.
fn honest_engine(dir: &Path) -> PathBuf {
    write_engine(
        dir,
        "engine.sh",
        r#"while read -r cmd i j rest; do
  case "$cmd" in
    find-path) echo "path $i $j: no" ;;
  esac
done < "$3"
echo "Iteration count: 2"
echo "Total time: 0.001 s""#,
    )
}

/// Engine whose answers depend on the strategy tag in the workload path.
fn buggy_engine(dir: &Path) -> PathBuf {
    write_engine(
        dir,
        "buggy.sh",
        r#"ans=no
case "$3" in *smart*) ans=yes ;; esac
while read -r cmd i j rest; do
  case "$cmd" in
    find-path) echo "path $i $j: $ans" ;;
  esac
done < "$3"
echo "Total time: 0.001 s""#,
    )
}

fn seed_dataset(root: &Path) {
    let graphs = root.join("D/Graphs");
    let grammars = root.join("D/Grammars");
    fs::create_dir_all(&graphs).unwrap();
    fs::create_dir_all(&grammars).unwrap();
    fs::write(graphs.join("tiny.txt"), THREE_EDGE_GRAPH).unwrap();
    fs::write(grammars.join("g_cnf.txt"), "S a b\n").unwrap();
}

fn harness() -> Command {
    Command::cargo_bin("cfpq-bench").unwrap()
}

#[test]
fn prepare_synthesizes_expected_workloads() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    seed_dataset(&root);

    harness()
        .args(["prepare", "D"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    let construct = fs::read_to_string(root.join("D/Queries/tiny/Construct/brute.txt")).unwrap();
    assert_eq!(
        construct,
        "brute-edge-add 1 2 a\nbrute-edge-add 2 3 b\nbrute-edge-add 1 3 a\n"
    );

    // 3 mutations + 6 ordered-pair queries over [1, 3], per strategy.
    for strategy in ["brute", "smart"] {
        let path = root.join(format!("D/Queries/tiny/Correctness/{strategy}.txt"));
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 9);
        assert_eq!(
            text.lines().filter(|l| l.starts_with("find-path")).count(),
            6
        );
    }
}

#[test]
fn prepare_twice_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    seed_dataset(&root);

    for _ in 0..2 {
        harness()
            .args(["prepare", "D"])
            .arg("--root")
            .arg(&root)
            .assert()
            .success();
    }
}

#[test]
fn bench_writes_timing_report() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    let results = tmp.path().join("results");
    seed_dataset(&root);
    let engine = honest_engine(tmp.path());

    // Small base_repeats keeps the test quick.
    let config = tmp.path().join("bench.yaml");
    fs::write(&config, "base_repeats: 2\nrepeat_tiers: []\n").unwrap();

    harness()
        .args(["prepare", "D"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    harness()
        .args(["bench", "D"])
        .arg("--root")
        .arg(&root)
        .arg("--results")
        .arg(&results)
        .arg("--engine")
        .arg(&engine)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("report written to"));

    let report = fs::read_to_string(results.join("D_bench.md")).unwrap();
    assert!(report.starts_with("# D\n"));
    assert!(report.contains("## Grammar: g_cnf"));
    assert!(report.contains("## Test type: Construct"));
    assert!(report.contains("| Graph | Brute | Smart |"));
    assert!(report.contains("| tiny | 0.001 | 0.001 |"));
}

#[test]
fn verify_agreeing_strategies_pass() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    let results = tmp.path().join("results");
    seed_dataset(&root);
    let engine = honest_engine(tmp.path());

    harness()
        .args(["prepare", "D"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    harness()
        .args(["verify", "D"])
        .arg("--root")
        .arg(&root)
        .arg("--results")
        .arg(&results)
        .arg("--engine")
        .arg(&engine)
        .assert()
        .success()
        .stdout(contains("0 mismatches"));

    let report = fs::read_to_string(results.join("D_correctness.md")).unwrap();
    assert!(report.contains("| Graph | equal(Brute, Smart) |"));
    assert!(report.contains("| tiny | true |"));
}

#[test]
fn verify_catches_divergent_strategies() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    let results = tmp.path().join("results");
    seed_dataset(&root);
    let engine = buggy_engine(tmp.path());

    harness()
        .args(["prepare", "D"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    harness()
        .args(["verify", "D"])
        .arg("--root")
        .arg(&root)
        .arg("--results")
        .arg(&results)
        .arg("--engine")
        .arg(&engine)
        .assert()
        .code(2)
        .stdout(contains("MISMATCH"));

    let report = fs::read_to_string(results.join("D_correctness.md")).unwrap();
    assert!(report.contains("| tiny | false |"));
}

#[test]
fn verify_keeps_logs_when_asked() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("input");
    let results = tmp.path().join("results");
    seed_dataset(&root);
    let engine = honest_engine(tmp.path());

    harness()
        .args(["prepare", "D"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    harness()
        .args(["verify", "D", "--keep-logs"])
        .arg("--root")
        .arg(&root)
        .arg("--results")
        .arg(&results)
        .arg("--engine")
        .arg(&engine)
        .assert()
        .success();

    let logs = results.join("logs/D");
    assert!(logs.join("tiny_g_cnf_Correctness_brute.log").is_file());
    assert!(logs.join("tiny_g_cnf_Correctness_smart.log").is_file());
}
