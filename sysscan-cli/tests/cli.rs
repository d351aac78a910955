use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sysscan() -> Command {
    Command::cargo_bin("sysscan").unwrap()
}

const METADATA: &str = "maintainer:\n  name: Jane Doe\n  email: jane@example.org\n\
                        short_desc: toy secretion systems\nvers: 0.9.1\n";

const DEFINITION: &str = r#"<model inter_gene_max_space="2" min_mandatory_genes_required="2"
    min_genes_required="2" vers="2.0">
    <gene name="gspC" presence="mandatory"/>
    <gene name="gspD" presence="mandatory"/>
    <gene name="gspE" presence="accessory"/>
</model>
"#;

/// Lay out a toy model package under `root/TFF`.
fn write_package(root: &Path) {
    let package = root.join("TFF");
    std::fs::create_dir_all(package.join("definitions")).unwrap();
    std::fs::create_dir_all(package.join("profiles")).unwrap();
    std::fs::write(package.join("metadata.yml"), METADATA).unwrap();
    std::fs::write(package.join("definitions").join("T2SS.xml"), DEFINITION).unwrap();
    for gene in ["gspC", "gspD", "gspE"] {
        std::fs::write(
            package.join("profiles").join(format!("{gene}.hmm")),
            format!("HMMER3/f\nNAME  {gene}\nLENG  100\nGA    22.00 22.00;\nSTATS LOCAL MSV\n"),
        )
        .unwrap();
    }
}

fn domtblout_row(target: &str, score: f64) -> String {
    format!(
        "{target} - 200 profile - 100 1e-20 {score} 0.1 1 1 1e-19 1e-12 {score} 0.1 1 95 5 190 1 200 0.95 -\n"
    )
}

/// Pre-compute the raw HMM reports so `--previous-run` skips hmmsearch.
fn write_reports(out_dir: &Path, hits: &[(&str, &str)]) {
    let hmmer_dir = out_dir.join("hmmer_results");
    std::fs::create_dir_all(&hmmer_dir).unwrap();
    for gene in ["gspC", "gspD", "gspE"] {
        let rows: String = hits
            .iter()
            .filter(|(hit_gene, _)| hit_gene == &gene)
            .map(|(_, target)| domtblout_row(target, 80.0))
            .collect();
        std::fs::write(
            hmmer_dir.join(format!("{gene}.search_hmm.out")),
            format!("# hmmsearch :: domtblout\n{rows}"),
        )
        .unwrap();
    }
}

fn write_database(root: &Path) -> std::path::PathBuf {
    let db = root.join("genome.fasta");
    let records: String = (1..=8).map(|i| format!(">prot{i}\nMKLV\n")).collect();
    std::fs::write(&db, records).unwrap();
    db
}

#[test]
fn help_describes_the_tool() {
    sysscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("macromolecular systems"));
}

#[test]
fn missing_database_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    sysscan()
        .arg("--db")
        .arg(dir.path().join("nonexistent.fasta"))
        .arg("--models-dir")
        .arg(dir.path())
        .args(["--models", "TFF"])
        .arg("--quiet")
        .assert()
        .code(1);
}

#[test]
fn unknown_db_type_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    let db = write_database(dir.path());
    sysscan()
        .arg("--db")
        .arg(&db)
        .args(["--db-type", "sideways"])
        .arg("--models-dir")
        .arg(dir.path())
        .args(["--models", "TFF"])
        .arg("--quiet")
        .assert()
        .code(1);
}

#[test]
fn previous_run_detects_a_system_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    let db = write_database(dir.path());
    let out_dir = dir.path().join("results");
    // gspC@2, gspD@3, gspE@4: one co-localized occurrence
    write_reports(&out_dir, &[("gspC", "prot2"), ("gspD", "prot3"), ("gspE", "prot4")]);

    sysscan()
        .arg("--db")
        .arg(&db)
        .args(["--db-type", "ordered_replicon"])
        .arg("--models-dir")
        .arg(dir.path())
        .args(["--models", "TFF", "all"])
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--previous-run")
        .arg("--quiet")
        .assert()
        .success();

    let best = std::fs::read_to_string(out_dir.join("best_solution.tsv")).unwrap();
    assert!(best.contains("# model package TFF 0.9.1"), "{best}");
    assert!(best.contains("genome_T2SS_1"), "{best}");
    assert!(best.contains("prot2\tgspC\t2"), "{best}");

    for file in [
        "best_solution.txt",
        "all_best_solutions.tsv",
        "all_systems.tsv",
        "rejected_candidates.tsv",
    ] {
        assert!(out_dir.join(file).exists(), "missing {file}");
    }
}

#[test]
fn scattered_hits_leave_only_rejections() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    let db = write_database(dir.path());
    let out_dir = dir.path().join("results");
    // gspC@1 and gspD@8 are too far apart to cluster
    write_reports(&out_dir, &[("gspC", "prot1"), ("gspD", "prot8")]);

    sysscan()
        .arg("--db")
        .arg(&db)
        .args(["--db-type", "ordered_replicon"])
        .arg("--models-dir")
        .arg(dir.path())
        .args(["--models", "TFF", "all"])
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--previous-run")
        .arg("--quiet")
        .assert()
        .success();

    let best = std::fs::read_to_string(out_dir.join("best_solution.tsv")).unwrap();
    assert!(!best.contains("genome_T2SS"), "{best}");
    let rejected = std::fs::read_to_string(out_dir.join("rejected_candidates.tsv")).unwrap();
    assert!(rejected.contains("NO_CLUSTER"), "{rejected}");
}

#[test]
fn check_accepts_a_consistent_package() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    sysscan()
        .arg("--check")
        .arg(dir.path().join("TFF"))
        .assert()
        .success();
}

#[test]
fn check_flags_a_broken_package() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path());
    // remove a profile referenced by the definition
    std::fs::remove_file(dir.path().join("TFF").join("profiles").join("gspD.hmm")).unwrap();
    sysscan()
        .arg("--check")
        .arg(dir.path().join("TFF"))
        .assert()
        .code(2);
}
