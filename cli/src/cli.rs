//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Synthesize the ECS Fargate integration-test stack for the Java agent
#[derive(Parser, Debug)]
#[command(
    name = "itest-stack",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log debug details to stderr (`RUST_LOG` takes precedence when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ./itest-stack.yaml)
    #[arg(long, global = true, env = "ITEST_STACK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage the agent jar and write the stack template
    Synth(commands::synth::SynthArgs),

    /// Show environment-scoped resource names
    Names(commands::names::NamesArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            command,
            ..
        } = self;
        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            json,
            config,
        });
        match command {
            Command::Synth(args) => commands::synth::run(&app, &args),
            Command::Names(args) => commands::names::run(&app, &args),
            Command::Config(cmd) => commands::config::run(&app, &cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
