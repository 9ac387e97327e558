#![forbid(unsafe_code)]
use assert_cmd::Command;
use permanence::Directory;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("permanence-cli").unwrap();
    cmd.arg("--data-dir").arg(data);
    cmd
}

fn as_admin(data: &Path) -> Command {
    let mut cmd = cli(data);
    cmd.args(["--user", "admin", "--password", "admin123"]);
    cmd
}

#[test]
fn full_campaign_from_the_command_line() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");

    cli(&data)
        .args([
            "init",
            "--admin-password",
            "admin123",
            "--deadline",
            "2099-01-01T00:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    as_admin(&data)
        .args([
            "add-shift",
            "--id",
            "xmas",
            "--holiday",
            "Christmas",
            "--date",
            "2025-12-25",
            "--time",
            "7am-3pm",
        ])
        .assert()
        .success();

    as_admin(&data)
        .args(["submit", "--shifts", "xmas"])
        .assert()
        .success();

    as_admin(&data)
        .args(["allocate", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xmas → admin"));

    as_admin(&data)
        .args(["allocate", "--seed", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already allocated"));

    as_admin(&data)
        .args(["reset", "--confirm", "nope"])
        .assert()
        .failure();

    as_admin(&data)
        .args(["reset", "--confirm", "RESET"])
        .assert()
        .success()
        .stdout(predicate::str::contains("System reset successfully"));

    let board = std::fs::read_to_string(data.join("board.json")).unwrap();
    assert!(board.contains("\"is_locked\": false"));
}

#[test]
fn rejects_bad_credentials() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    cli(&data)
        .args(["init", "--admin-password", "admin123"])
        .assert()
        .success();

    cli(&data)
        .args(["--user", "admin", "--password", "wrong", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid credentials"));

    cli(&data).arg("status").assert().failure();
}

#[test]
fn duplicate_shift_id_prints_nothing() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    cli(&data)
        .args(["init", "--admin-password", "admin123"])
        .assert()
        .success();

    let add = [
        "add-shift",
        "--id",
        "xmas",
        "--holiday",
        "Christmas",
        "--date",
        "2025-12-25",
        "--time",
        "7am-3pm",
    ];
    as_admin(&data)
        .args(add)
        .assert()
        .success()
        .stdout(predicate::str::diff("xmas\n"));
    as_admin(&data)
        .args(add)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("duplicate shift id"));
}

#[test]
fn directory_can_be_replaced_wholesale() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    cli(&data)
        .args(["init", "--admin-password", "admin123"])
        .assert()
        .success();

    let upload = dir.path().join("upload.json");
    let replacement = Directory::with_manager("boss", "b0ss").unwrap();
    std::fs::write(&upload, serde_json::to_string(&replacement).unwrap()).unwrap();

    as_admin(&data)
        .args(["import-directory", "--replace", "--json"])
        .arg(&upload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Directory replaced with 1 account(s)"));

    cli(&data)
        .args(["--user", "boss", "--password", "b0ss", "status"])
        .assert()
        .success();
    as_admin(&data).arg("status").assert().failure();
}
