use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn budgetbook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("budgetbook").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn init(home: &Path) -> std::path::PathBuf {
    let data_dir = home.join("ledger");
    budgetbook(home)
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized budgetbook"));
    data_dir
}

const STATEMENT: &str = "Date,Description,Amount,Category\n\
01/15/2025,WALMART GROCERY,45.67,Groceries\n\
01/16/2025,Paycheck,-2000.00,\n\
not-a-date,Broken row,1.00,\n";

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    budgetbook(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("categories"));
}

#[test]
fn test_import_requires_init() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("bank.csv");
    std::fs::write(&file, STATEMENT).unwrap();
    budgetbook(home.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("budgetbook init"));
}

#[test]
fn test_preview_json_then_commit() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("bank.csv");
    std::fs::write(&file, STATEMENT).unwrap();

    budgetbook(home.path())
        .arg("import")
        .arg(&file)
        .args(["--preview", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 2"))
        .stdout(predicate::str::contains("\"transaction_type\": \"income\""));

    budgetbook(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  0"));

    budgetbook(home.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 imported, 0 skipped"));

    budgetbook(home.path())
        .args(["transactions", "list", "--from", "2025-01-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paycheck"))
        .stdout(predicate::str::contains("WALMART").not());
}

#[test]
fn test_schema_failure_exits_nonzero_with_json() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("bad.csv");
    std::fs::write(&file, "when,what\n2025-01-01,Coffee\n").unwrap();

    budgetbook(home.path())
        .arg("import")
        .arg(&file)
        .arg("--json")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("Missing required columns"));
}

#[test]
fn test_unsupported_extension() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("bank.xlsx");
    std::fs::write(&file, "whatever").unwrap();
    budgetbook(home.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file"));
}

#[test]
fn test_add_category() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    budgetbook(home.path())
        .args(["categories", "add", "Pets", "--description", "Vet and food"])
        .assert()
        .success();
    budgetbook(home.path())
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pets"))
        .stdout(predicate::str::contains("Food & Groceries"));
}
