//! Integration tests for `itest-stack config show`.
//!
//! All tests point `ITEST_STACK_CONFIG` at a temp path so they never read
//! a settings file from the working directory.

#![allow(clippy::expect_used)]

use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::itest_stack;

/// Returns a `TempDir` and the path string for a settings file inside it.
/// The file does NOT exist yet.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("itest-stack.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let (_dir, path) = temp_config_path();
    itest_stack()
        .args(["config", "show"])
        .env("ITEST_STACK_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("interval_secs: 60"))
        .stdout(predicate::str::contains("unhealthy_threshold: 10"))
        .stdout(predicate::str::contains("debug_spandump: /dev/stdout"));
}

#[test]
fn test_config_show_reads_file_values() {
    let (_dir, path) = temp_config_path();
    std::fs::write(
        &path,
        "health_check:\n  interval_secs: 10\n  unhealthy_threshold: 5\ncontainer:\n  debug_spandump: \"true\"\n",
    )
    .expect("write");
    itest_stack()
        .args(["config", "show"])
        .env("ITEST_STACK_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("interval_secs: 10"))
        .stdout(predicate::str::contains("unhealthy_threshold: 5"));
}

#[test]
fn test_config_show_json_merges_environment() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "environment:\n  region: us-east-1\n").expect("write");
    let output = itest_stack()
        .args(["config", "show", "--json"])
        .env("ITEST_STACK_CONFIG", &path)
        .env("CDK_DEFAULT_REGION", "eu-west-1")
        .env("DEPLOYMENT_SUFFIX", "pr-42")
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["environment"]["region"], "eu-west-1");
    assert_eq!(value["environment"]["suffix"], "pr-42");
}

#[test]
fn test_config_show_malformed_file_fails() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "health_check: [unterminated").expect("write");
    itest_stack()
        .args(["config", "show"])
        .env("ITEST_STACK_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse settings file"));
}

#[test]
fn test_config_show_stdout_is_a_yaml_document() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "health_check:\n  interval_secs: 10\n").expect("write");
    let output = itest_stack()
        .args(["config", "show"])
        .env("ITEST_STACK_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.starts_with("# settings file: "), "{text}");
    let settings: itest_stack::domain::StackSettings =
        serde_yaml::from_str(&text).expect("stdout parses as settings");
    assert_eq!(settings.health_check.interval_secs, 10);
    assert_eq!(settings.network.max_azs, 3);
}
