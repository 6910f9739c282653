//! `itest-stack config` — show the effective settings.

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::commands::EnvironmentArgs;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings (file + flags + environment)
    Show {
        #[command(flatten)]
        env: EnvironmentArgs,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the settings file is malformed.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { env } => show_config(app, env),
    }
}

fn show_config(app: &AppContext, env: &EnvironmentArgs) -> Result<()> {
    let settings = config_service::resolve_settings(&app.config_store, &env.into())?;
    if app.is_json() {
        return json::print(&settings);
    }
    let yaml = serde_yaml::to_string(&settings).context("cannot serialize settings")?;
    // As a comment, so stdout stays a valid YAML document.
    println!("# settings file: {}", app.config_store.path().display());
    print!("{yaml}");
    Ok(())
}
