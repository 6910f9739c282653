//! Tests for the `synth` application service.
//!
//! Verifies that staging happens before composition, that a missing
//! artifact aborts before any file is written, and that the outcome
//! reflects the resolved names.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use itest_stack::application::services::synth::{
    SynthRequest, compose_stack, stage_artifact, synthesize,
};
use itest_stack::domain::{ArtifactLayout, DeploymentSuffix, StackError, StackSettings};

use crate::mocks::{MemoryFs, RecordingReporter};

const STACK_DIR: &str = "/repo/integration-tests/ecs/src/stack";
const JAR: &str = "/repo/agent/build/libs/agent-dev-SNAPSHOT-all.jar";
const STAGED: &str =
    "/repo/integration-tests/ecs/src/stack/containers/server/distro/lumigo-opentelemetry-distro.jar";

fn request<'a>(settings: &'a StackSettings, artifact: Option<&'a Path>) -> SynthRequest<'a> {
    SynthRequest {
        settings,
        stack_dir: Path::new(STACK_DIR),
        artifact,
        out_dir: Path::new("/out"),
    }
}

#[test]
fn test_stage_artifact_copies_then_hashes() {
    let fs = MemoryFs::new().with_file(JAR, b"jar-bytes");
    let staged = stage_artifact(&fs, &ArtifactLayout::default(), Path::new(STACK_DIR), None)
        .expect("stage");
    assert_eq!(staged.staged_path, PathBuf::from(STAGED));
    assert_eq!(fs.read(Path::new(STAGED)).as_deref(), Some(&b"jar-bytes"[..]));
    let calls = fs.calls();
    assert!(calls[0].starts_with("copy "), "{calls:?}");
    assert!(calls[1].starts_with("hash "), "{calls:?}");
}

#[test]
fn test_stage_artifact_missing_is_typed_error_without_side_effects() {
    let fs = MemoryFs::new();
    let err = stage_artifact(&fs, &ArtifactLayout::default(), Path::new(STACK_DIR), None)
        .unwrap_err();
    match err.downcast_ref::<StackError>() {
        Some(StackError::ArtifactMissing { path }) => assert_eq!(path, Path::new(JAR)),
        other => panic!("expected ArtifactMissing, got {other:?}"),
    }
    assert!(fs.calls().is_empty());
}

#[test]
fn test_stage_artifact_explicit_path_overrides_layout() {
    let fs = MemoryFs::new().with_file("/elsewhere/agent.jar", b"x");
    let staged = stage_artifact(
        &fs,
        &ArtifactLayout::default(),
        Path::new(STACK_DIR),
        Some(Path::new("/elsewhere/agent.jar")),
    )
    .expect("stage");
    assert_eq!(staged.staged_path, PathBuf::from(STAGED));
}

#[test]
fn test_stage_artifact_copy_failure_propagates() {
    let fs = MemoryFs::new().with_file(JAR, b"x").failing_copy();
    let err = stage_artifact(&fs, &ArtifactLayout::default(), Path::new(STACK_DIR), None)
        .unwrap_err();
    assert!(format!("{err:#}").contains("disk full"), "{err:#}");
}

#[test]
fn test_synthesize_missing_artifact_writes_nothing() {
    let fs = MemoryFs::new();
    let reporter = RecordingReporter::default();
    let settings = StackSettings::default();
    let err = synthesize(&fs, &reporter, &request(&settings, None)).unwrap_err();
    assert!(err.downcast_ref::<StackError>().is_some());
    assert!(fs.paths().is_empty());
    assert!(!fs.calls().iter().any(|c| c.starts_with("write ")));
}

#[test]
fn test_synthesize_writes_template_and_assets() {
    let fs = MemoryFs::new().with_file(JAR, b"jar");
    let reporter = RecordingReporter::default();
    let mut settings = StackSettings::default();
    settings.environment.suffix = DeploymentSuffix::new(Some("pr-42"));
    settings.environment.region = Some("eu-west-1".to_string());

    let outcome = synthesize(&fs, &reporter, &request(&settings, None)).expect("synth");

    assert_eq!(outcome.stack_name, "lumigo-java-distro-itests-pr-42");
    assert_eq!(
        outcome.template_path,
        PathBuf::from("/out/lumigo-java-distro-itests-pr-42.template.json")
    );
    let template = fs.read(&outcome.template_path).expect("template written");
    let template: serde_json::Value = serde_json::from_slice(&template).expect("json");
    assert_eq!(
        template["Resources"]["Cluster"]["Properties"]["ClusterName"],
        "JavaagentFargateTestCluster-pr-42"
    );
    assert!(fs.read(&outcome.assets_path).is_some());

    let calls = fs.calls();
    let copy = calls.iter().position(|c| c.starts_with("copy ")).expect("copy");
    let write = calls.iter().position(|c| c.starts_with("write ")).expect("write");
    assert!(copy < write, "staging must precede output: {calls:?}");
}

#[test]
fn test_compose_stack_warns_without_region() {
    let fs = MemoryFs::new().with_file(JAR, b"jar");
    let reporter = RecordingReporter::default();
    let settings = StackSettings::default();
    let (stack, _) = compose_stack(&fs, &reporter, &request(&settings, None)).expect("compose");
    assert_eq!(
        stack.task_definition.container.environment["AWS_REGION"],
        "unknown_region"
    );
    assert!(
        reporter.events().iter().any(|e| e.starts_with("warn:")),
        "{:?}",
        reporter.events()
    );
}

#[test]
fn test_synthesize_is_deterministic() {
    let settings = StackSettings::default();
    let render = || {
        let fs = MemoryFs::new().with_file(JAR, b"jar");
        let outcome =
            synthesize(&fs, &RecordingReporter::default(), &request(&settings, None)).expect("synth");
        fs.read(&outcome.template_path).expect("template")
    };
    assert_eq!(render(), render());
}

#[test]
fn test_stage_artifact_in_place_is_not_copied_over_itself() {
    let fs = MemoryFs::new().with_file(STAGED, b"already-staged");
    let staged = stage_artifact(
        &fs,
        &ArtifactLayout::default(),
        Path::new(STACK_DIR),
        Some(Path::new(STAGED)),
    )
    .expect("stage");
    assert_eq!(staged.staged_path, PathBuf::from(STAGED));
    assert_eq!(
        fs.read(Path::new(STAGED)).as_deref(),
        Some(&b"already-staged"[..])
    );
    let calls = fs.calls();
    assert!(!calls.iter().any(|c| c.starts_with("copy ")), "{calls:?}");
    assert_eq!(staged.sha256, format!("{:064x}", b"already-staged".len()));
}

#[test]
fn test_compose_stack_warns_on_blank_region() {
    let fs = MemoryFs::new().with_file(JAR, b"jar");
    let reporter = RecordingReporter::default();
    let mut settings = StackSettings::default();
    settings.environment.region = Some("   ".to_string());
    compose_stack(&fs, &reporter, &request(&settings, None)).expect("compose");
    assert!(
        reporter.events().iter().any(|e| e.starts_with("warn:")),
        "{:?}",
        reporter.events()
    );
}

#[test]
fn test_compose_stack_no_warning_with_region() {
    let fs = MemoryFs::new().with_file(JAR, b"jar");
    let reporter = RecordingReporter::default();
    let mut settings = StackSettings::default();
    settings.environment.region = Some("eu-west-1".to_string());
    compose_stack(&fs, &reporter, &request(&settings, None)).expect("compose");
    assert!(!reporter.events().iter().any(|e| e.starts_with("warn:")));
}

#[test]
fn test_compose_stack_bad_network_fails_before_staging() {
    let fs = MemoryFs::new().with_file(JAR, b"jar");
    let reporter = RecordingReporter::default();
    let mut settings = StackSettings::default();
    settings.network.cidr = "10.0.0.0/24".parse().expect("cidr");
    let err = compose_stack(&fs, &reporter, &request(&settings, None)).unwrap_err();
    assert!(
        matches!(err.downcast_ref::<StackError>(), Some(StackError::Network(_))),
        "{err:#}"
    );
    assert!(fs.calls().is_empty(), "{:?}", fs.calls());
    assert!(reporter.events().is_empty());
}
