//! CLI integration tests.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

use support::config::{minimal_toml, write_temp_config};

fn upsdash() -> Command {
    let mut cmd = cargo_bin_cmd!("upsdash");
    cmd.env_remove("UPSDASH_API_TOKEN");
    cmd
}

#[test]
fn test_help() {
    upsdash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upsdash"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    upsdash()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("upsdash"));
}

#[test]
fn config_validate_accepts_valid_file() {
    let file = write_temp_config(&minimal_toml("http://nas.local:8000"));
    upsdash()
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn config_validate_reports_missing_token() {
    let file = write_temp_config("[server]\nbase_url = \"http://nas.local:8000\"\n");
    upsdash()
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_token"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    upsdash()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn config_show_json_never_prints_token() {
    let file = write_temp_config(&minimal_toml("http://nas.local:8000"));
    upsdash()
        .arg("--config")
        .arg(file.path())
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"config\""))
        .stdout(predicate::str::contains("file-token").not());
}

#[test]
fn config_show_masks_token_in_realtime_url() {
    let file = write_temp_config(&minimal_toml("http://nas.local:8000"));
    upsdash()
        .arg("--config")
        .arg(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://nas.local:8000/api/ws"))
        .stdout(predicate::str::contains("file-token").not());
}
