//! End-to-end tests driving the `pinelint` binary through `assert_cmd`,
//! covering the CLI contract (exit codes, `--format`) and the six concrete
//! scenarios the analyzer is expected to handle.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn pine_file(source: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(".pine")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(source.as_bytes()).expect("failed to write temp file");
    file
}

fn pinelint() -> Command {
    Command::cargo_bin("pinelint").expect("pinelint binary should build")
}

#[test]
fn help_output_mentions_check_subcommand() {
    pinelint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"));
}

#[test]
fn missing_file_exits_with_code_two() {
    pinelint()
        .args(["check", "/nonexistent/path/to/script.pine"])
        .assert()
        .code(2);
}

#[test]
fn scenario_clean_script_is_valid() {
    let file = pine_file("//@version=5\nindicator(\"T\")\nvar int x = 10\nplot(x)\n");
    pinelint()
        .args(["check", file.path().to_str().unwrap()])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Found 0 errors"));
}

#[test]
fn scenario_type_mismatch_and_undefined_identifier() {
    let file = pine_file("//@version=5\nindicator(\"T\")\nvar int x = \"s\"\nplot(y)\n");
    let output = pinelint()
        .args(["check", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["error_count"], 2);
    assert_eq!(json["valid"], false);
}

#[test]
fn scenario_missing_version_directive() {
    let file = pine_file("indicator(\"T\")\nplot(close)\n");
    pinelint()
        .args(["check", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("R001"));
}

#[test]
fn scenario_unsupported_version() {
    let file = pine_file("//@version=7\n");
    pinelint()
        .args(["check", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("R003"));
}

#[test]
fn scenario_one_liner_function_resolves() {
    let file = pine_file("//@version=5\nindicator(\"T\")\nf(x) => x * 2\nplot(f(close))\n");
    pinelint()
        .args(["check", file.path().to_str().unwrap()])
        .assert()
        .code(0);
}

#[test]
fn scenario_shadowing_warns_without_errors() {
    let file = pine_file(
        "//@version=5\nindicator(\"T\")\nvar x = 1\nif true\n    var x = 2\n    plot(x)\n",
    );
    let output = pinelint()
        .args(["check", file.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["error_count"], 0);
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert!(diagnostics.iter().any(|d| d["code"] == "W001"));
}
