//! `itest-stack synth` — stage the agent jar and write the stack template.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::synth::{self, DEFAULT_OUT_DIR, SynthRequest};
use crate::commands::EnvironmentArgs;
use crate::output::json;

/// Arguments for the synth command.
#[derive(Args, Debug)]
pub struct SynthArgs {
    #[command(flatten)]
    pub env: EnvironmentArgs,

    /// Directory holding the stack definition and its `containers/` tree
    #[arg(long, default_value = ".")]
    pub stack_dir: PathBuf,

    /// Agent jar to stage, instead of the one found relative to the stack directory
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// Directory the template and asset manifest are written to
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,
}

/// Run the synth command.
///
/// # Errors
///
/// Returns an error if the settings file is malformed, the stack directory
/// does not exist, the agent jar is missing, or writing the output fails.
pub fn run(app: &AppContext, args: &SynthArgs) -> Result<()> {
    let settings = config_service::resolve_settings(&app.config_store, &(&args.env).into())?;
    let stack_dir = std::fs::canonicalize(&args.stack_dir)
        .with_context(|| format!("stack directory {} not found", args.stack_dir.display()))?;

    let request = SynthRequest {
        settings: &settings,
        stack_dir: &stack_dir,
        artifact: args.artifact.as_deref(),
        out_dir: &args.out_dir,
    };
    let outcome = synth::synthesize(&app.fs, &app.reporter(), &request)?;

    if app.is_json() {
        return json::print(&outcome);
    }
    let out = &app.output;
    out.header(&outcome.stack_name);
    out.kv("template ", &outcome.template_path.display().to_string());
    out.kv("assets   ", &outcome.assets_path.display().to_string());
    out.kv("artifact ", &outcome.staged_artifact.display().to_string());
    out.kv("sha256   ", &outcome.artifact_sha256);
    Ok(())
}
