//! General CLI surface tests: help, version, completions, config.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn atc() -> Command {
    let mut cmd = Command::cargo_bin("atc").expect("binary is built");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_all_commands() {
    atc().arg("--help").assert().success().stdout(
        predicate::str::contains("compact")
            .and(predicate::str::contains("screen"))
            .and(predicate::str::contains("analyze"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn version_flag_works() {
    atc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("atc"));
}

#[test]
fn no_args_shows_usage() {
    atc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completions_generate_for_bash() {
    atc()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atc"));
}

#[test]
fn config_path_prints_location() {
    let dir = TempDir::new().unwrap();
    atc()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_init_then_show_round_trips() {
    let dir = TempDir::new().unwrap();
    atc()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success();

    atc()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mode")
                .and(predicate::str::contains("min_frame_interval_ms")),
        );
}
