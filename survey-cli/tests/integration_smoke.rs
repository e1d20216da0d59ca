//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("survey").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_migrate_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("survey.db");

    let mut cmd = Command::cargo_bin("survey").unwrap();
    cmd.arg("migrate")
        .arg("--database-url")
        .arg(format!("sqlite://{}", db_path.display()))
        .env_remove("DATABASE_URL");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Migrations applied"));
    assert!(db_path.exists());
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("survey").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("survey"));
}

#[test]
fn test_unknown_command_fails() {
    let mut cmd = Command::cargo_bin("survey").unwrap();
    cmd.arg("frobnicate");

    cmd.assert().failure();
}
