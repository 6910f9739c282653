//! Integration tests for `itest-stack synth`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::helpers::{Fixture, read_json};

#[test]
fn test_synth_stages_jar_and_writes_template() {
    let fx = Fixture::new(true);
    fx.synth()
        .env("CDK_DEFAULT_REGION", "us-east-1")
        .assert()
        .success()
        .stdout(predicate::str::contains("lumigo-java-distro-itests"));

    let staged = std::fs::read(fx.staged_jar()).expect("staged jar");
    assert_eq!(staged, b"PK\x03\x04fake-jar");

    let template = fx.template("lumigo-java-distro-itests");
    let resources = template["Resources"].as_object().expect("resources");
    assert!(resources.values().any(|r| r["Type"] == "AWS::ECS::Service"));
    assert!(resources.values().any(|r| r["Type"] == "AWS::EC2::VPC"));
    let asset_manifest = fx
        .out_dir()
        .join("lumigo-java-distro-itests.assets.json");
    assert!(asset_manifest.is_file());
}

#[test]
fn test_synth_with_suffix_scopes_stack_name() {
    let fx = Fixture::new(true);
    fx.synth().env("DEPLOYMENT_SUFFIX", "pr-42").assert().success();

    let template = fx.template("lumigo-java-distro-itests-pr-42");
    let text = template.to_string();
    assert!(text.contains("JavaagentFargateTestCluster-pr-42"));
    assert!(text.contains("JavaagentFargateTestVpc-pr-42"));
    assert!(text.contains("JavaagentFargateTestLogGroup-pr-42"));
}

#[test]
fn test_synth_missing_jar_fails_without_side_effects() {
    let fx = Fixture::new(false);
    fx.synth()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("agent-dev-SNAPSHOT-all.jar"))
        .stderr(predicate::str::contains("Agent artifact not found"));

    assert!(!fx.out_dir().exists(), "no output directory on failure");
    assert!(
        !fx.stack_dir().join("containers").exists(),
        "no build context created on failure"
    );
}

#[test]
fn test_synth_missing_jar_json_error_code() {
    let fx = Fixture::new(false);
    let output = fx.synth().arg("--json").output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "artifact_missing");
}

#[test]
fn test_synth_explicit_artifact_overrides_lookup() {
    let fx = Fixture::new(false);
    let jar = fx.root.path().join("custom.jar");
    std::fs::write(&jar, b"custom").expect("jar");

    fx.synth().arg("--artifact").arg(&jar).assert().success();
    assert_eq!(std::fs::read(fx.staged_jar()).expect("staged"), b"custom");
}

#[test]
fn test_synth_json_reports_outcome() {
    let fx = Fixture::new(true);
    let output = fx.synth().arg("--json").output().expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["stack_name"], "lumigo-java-distro-itests");
    assert_eq!(value["artifact_sha256"].as_str().map(str::len), Some(64));
    let template_path = value["template_path"].as_str().expect("template path");
    let template = read_json(std::path::Path::new(template_path));
    assert!(template["Outputs"].is_object());
}

#[test]
fn test_synth_is_deterministic() {
    let fx = Fixture::new(true);
    fx.synth().assert().success();
    let first = fx.template("lumigo-java-distro-itests");
    fx.synth().assert().success();
    assert_eq!(first, fx.template("lumigo-java-distro-itests"));
}

#[test]
fn test_synth_missing_stack_dir_fails() {
    let fx = Fixture::new(true);
    let mut cmd = crate::helpers::itest_stack();
    cmd.current_dir(fx.root.path())
        .args(["synth", "--stack-dir", "does/not/exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack directory"));
}

#[test]
fn test_synth_artifact_already_in_build_context_is_kept() {
    let fx = Fixture::new(false);
    let staged = fx.staged_jar();
    std::fs::create_dir_all(staged.parent().expect("parent")).expect("distro dir");
    std::fs::write(&staged, b"staged").expect("jar");

    let output = fx
        .synth()
        .arg("--json")
        .arg("--artifact")
        .arg(&staged)
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(std::fs::read(&staged).expect("staged"), b"staged");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    // SHA-256 of "staged", not of an empty file.
    assert_eq!(
        value["artifact_sha256"],
        "8d906d61f92c9696387e566ecee255b733c79536074173a8eab915bad2d1fa28"
    );
}

#[test]
fn test_synth_network_settings_shape_the_vpc() {
    let fx = Fixture::new(true);
    let settings = fx.root.path().join("itest-stack.yaml");
    std::fs::write(&settings, "network:\n  cidr: 10.42.0.0/16\n  max_azs: 2\n").expect("settings");

    fx.synth()
        .env("ITEST_STACK_CONFIG", &settings)
        .assert()
        .success();

    let template = fx.template("lumigo-java-distro-itests");
    let resources = template["Resources"].as_object().expect("resources");
    assert_eq!(template["Resources"]["Vpc"]["Properties"]["CidrBlock"], "10.42.0.0/16");
    let subnets: Vec<_> = resources
        .values()
        .filter(|r| r["Type"] == "AWS::EC2::Subnet")
        .collect();
    assert_eq!(subnets.len(), 4);
    assert!(
        subnets
            .iter()
            .all(|s| s["Properties"]["CidrBlock"].as_str().is_some_and(|c| c.starts_with("10.42.")))
    );
}

#[test]
fn test_synth_undersized_network_fails_before_staging() {
    let fx = Fixture::new(true);
    let settings = fx.root.path().join("itest-stack.yaml");
    std::fs::write(&settings, "network:\n  cidr: 10.0.0.0/24\n").expect("settings");

    let output = fx
        .synth()
        .arg("--json")
        .env("ITEST_STACK_CONFIG", &settings)
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["code"], "network_layout");
    assert!(!fx.out_dir().exists());
    assert!(!fx.stack_dir().join("containers").exists());
}

#[test]
fn test_synth_malformed_network_cidr_is_config_error() {
    let fx = Fixture::new(true);
    let settings = fx.root.path().join("itest-stack.yaml");
    std::fs::write(&settings, "network:\n  cidr: 10.0.0.0/40\n").expect("settings");

    let output = fx
        .synth()
        .arg("--json")
        .env("ITEST_STACK_CONFIG", &settings)
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["code"], "config_invalid");
}
