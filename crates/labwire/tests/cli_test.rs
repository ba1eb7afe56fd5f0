//! Integration tests for the `labwire` CLI binary.
//!
//! These cover argument parsing, help output, shell completions and the
//! error paths reached before any server call.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `labwire` binary with env isolation.
///
/// Clears all `LABWIRE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn labwire_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("labwire");
    cmd.env("HOME", "/tmp/labwire-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/labwire-cli-test-nonexistent")
        .env_remove("LABWIRE_PROFILE")
        .env_remove("LABWIRE_SERVER")
        .env_remove("LABWIRE_DOMAIN")
        .env_remove("LABWIRE_USERNAME")
        .env_remove("LABWIRE_PASSWORD")
        .env_remove("LABWIRE_RESERVATION_ID")
        .env_remove("LABWIRE_OUTPUT")
        .env_remove("LABWIRE_INSECURE")
        .env_remove("LABWIRE_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = labwire_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    labwire_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("lab reservation")
            .and(predicate::str::contains("routes"))
            .and(predicate::str::contains("command"))
            .and(predicate::str::contains("cables")),
    );
}

#[test]
fn test_version_flag() {
    labwire_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("labwire"));
}

#[test]
fn test_routes_connect_help_lists_selectors() {
    labwire_cmd()
        .args(["routes", "connect", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--type")
                .and(predicate::str::contains("--family"))
                .and(predicate::str::contains("--evaluate-by")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    labwire_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    labwire_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config (no server needed) ───────────────────────────────────────

#[test]
fn test_config_path_prints_toml_path() {
    labwire_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults_without_file() {
    labwire_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[notifications]"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = labwire_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_input_requires_name_value() {
    let output = labwire_cmd()
        .args(["command", "run", "Reboot", "--input", "novalue"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("NAME=VALUE"));
}

#[test]
fn test_routes_without_server_reports_missing_config() {
    let output = labwire_cmd()
        .args(["routes", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("config") || text.contains("Config"),
        "Expected config hint:\n{text}"
    );
}

#[test]
fn test_routes_without_reservation_is_usage_error() {
    let output = labwire_cmd()
        .args(["--server", "http://127.0.0.1:9", "--username", "admin"])
        .env("LABWIRE_PASSWORD", "secret")
        .args(["routes", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("reservation"));
}

#[test]
fn test_malformed_reservation_id_is_rejected() {
    let output = labwire_cmd()
        .args(["--reservation", "not-a-guid", "routes", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("not-a-guid"));
}
