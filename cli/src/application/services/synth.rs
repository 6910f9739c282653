//! Application service — stack synthesis use-case.
//!
//! Stage the agent artifact, compose the stack, render it, write it out.
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::application::ports::{ArtifactStager, FileHasher, OutputWriter, ProgressReporter};
use crate::domain::error::StackError;
use crate::domain::layout::{ArtifactLayout, StagedArtifact};
use crate::domain::naming::ResourceNames;
use crate::domain::stack::{DeploymentStack, StackBuilder};
use crate::domain::template::{render_asset_manifest, render_template};
use crate::domain::{StackSettings, UNKNOWN_REGION};

/// Default output directory, matching the CDK toolkit's.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Inputs of a single synthesis run.
pub struct SynthRequest<'a> {
    pub settings: &'a StackSettings,
    /// Directory holding the stack definition; the artifact is addressed
    /// relative to it.
    pub stack_dir: &'a Path,
    /// Explicit artifact path, bypassing the relative lookup.
    pub artifact: Option<&'a Path>,
    pub out_dir: &'a Path,
}

/// What a successful synthesis produced.
#[derive(Debug, Clone, Serialize)]
pub struct SynthOutcome {
    pub stack_name: String,
    pub names: ResourceNames,
    pub template_path: PathBuf,
    pub assets_path: PathBuf,
    pub staged_artifact: PathBuf,
    pub artifact_sha256: String,
}

/// Copy the agent jar into the container build context.
///
/// The existence check runs first; nothing is created or copied when the
/// source jar is missing.
///
/// # Errors
///
/// Returns [`StackError::ArtifactMissing`] if the source jar does not exist,
/// or an I/O error if copying or hashing fails.
pub fn stage_artifact(
    fs: &(impl ArtifactStager + FileHasher),
    layout: &ArtifactLayout,
    stack_dir: &Path,
    artifact: Option<&Path>,
) -> Result<StagedArtifact> {
    let source = artifact.map_or_else(|| layout.source_artifact(stack_dir), Path::to_path_buf);
    if !fs.is_file(&source) {
        return Err(StackError::ArtifactMissing { path: source }.into());
    }

    let context_dir = layout.context_dir(stack_dir);
    let staged_path = layout.staged_artifact(stack_dir);
    // Copying a file onto itself truncates it.
    if fs.is_same_file(&source, &staged_path) {
        debug!(staged = %staged_path.display(), "artifact already in build context");
    } else {
        let bytes = fs.copy_artifact(&source, &staged_path).with_context(|| {
            format!("staging {} into {}", source.display(), context_dir.display())
        })?;
        info!(
            source = %source.display(),
            staged = %staged_path.display(),
            bytes,
            "staged agent artifact"
        );
    }
    let sha256 = fs.sha256_file(&staged_path)?;

    Ok(StagedArtifact::new(context_dir, staged_path, sha256))
}

/// Stage the artifact and compose the stack, without writing anything else.
///
/// # Errors
///
/// Returns an error if the network cannot be laid out or staging fails.
/// The network is checked first, so neither error leaves a staged jar.
pub fn compose_stack(
    fs: &(impl ArtifactStager + FileHasher),
    reporter: &impl ProgressReporter,
    request: &SynthRequest<'_>,
) -> Result<(DeploymentStack, StagedArtifact)> {
    // A bad network layout must fail before the build context is touched.
    StackBuilder::new(request.settings)
        .network()
        .map_err(StackError::from)?;

    reporter.step("staging agent artifact...");
    let staged = stage_artifact(
        fs,
        &request.settings.artifact,
        request.stack_dir,
        request.artifact,
    )?;
    reporter.success(&format!("staged {}", staged.staged_path.display()));

    reporter.step("composing stack...");
    let stack = StackBuilder::new(request.settings).compose(&staged)?;
    debug!(stack = %stack.stack_name, subnets = stack.subnets.len(), "composed stack");
    if request.settings.environment.region_or_unknown() == UNKNOWN_REGION {
        reporter.warn("no region supplied; AWS_REGION will be 'unknown_region'");
    }
    Ok((stack, staged))
}

/// Full synthesis: stage, compose, render, write.
///
/// # Errors
///
/// Returns an error if any step fails. A missing artifact aborts before any
/// file is written.
pub fn synthesize(
    fs: &(impl ArtifactStager + FileHasher + OutputWriter),
    reporter: &impl ProgressReporter,
    request: &SynthRequest<'_>,
) -> Result<SynthOutcome> {
    let (stack, staged) = compose_stack(fs, reporter, request)?;

    let template_path = request
        .out_dir
        .join(format!("{}.template.json", stack.stack_name));
    let assets_path = request
        .out_dir
        .join(format!("{}.assets.json", stack.stack_name));

    let template = serde_json::to_string_pretty(&render_template(&stack))
        .context("serializing template")?;
    let manifest = serde_json::to_string_pretty(&render_asset_manifest(&stack))
        .context("serializing asset manifest")?;

    reporter.step("writing template...");
    fs.write_document(&template_path, &template)?;
    fs.write_document(&assets_path, &manifest)?;
    info!(template = %template_path.display(), assets = %assets_path.display(), "wrote stack");
    reporter.success(&format!("synthesized {}", stack.stack_name));

    Ok(SynthOutcome {
        stack_name: stack.stack_name,
        names: stack.names,
        template_path,
        assets_path,
        staged_artifact: staged.staged_path,
        artifact_sha256: staged.sha256,
    })
}
