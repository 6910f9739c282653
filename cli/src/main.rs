//! itest-stack - synthesizes the Java agent integration-test stack

use clap::Parser;
use tracing_subscriber::EnvFilter;

use itest_stack::cli::Cli;
use itest_stack::domain::{ConfigError, StackError};
use itest_stack::output::{OutputContext, json};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_ansi(!cli.no_color)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    let no_color = cli.no_color;
    if let Err(e) = cli.run() {
        if json_mode {
            if let Ok(text) = json::format_error(&format!("{e:#}"), error_code(&e)) {
                println!("{text}");
            }
        } else {
            OutputContext::new(no_color, false).error(&format!("Error: {e:#}"));
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set; otherwise `debug` with `--verbose`, `warn` without.
fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Stable machine-readable code for `--json` error objects.
fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(stack) = e.downcast_ref::<StackError>() {
        return match stack {
            StackError::ArtifactMissing { .. } => "artifact_missing",
            StackError::Network(_) => "network_layout",
        };
    }
    if e.downcast_ref::<ConfigError>().is_some() {
        return "config_invalid";
    }
    "internal"
}
