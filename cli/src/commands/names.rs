//! `itest-stack names` — print the environment-scoped resource names.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::commands::EnvironmentArgs;
use crate::domain::StackBuilder;
use crate::output::json;

/// Arguments for the names command.
#[derive(Args, Debug)]
pub struct NamesArgs {
    #[command(flatten)]
    pub env: EnvironmentArgs,
}

/// Run the names command. Never stages or writes anything.
///
/// # Errors
///
/// Returns an error if the settings file is malformed.
pub fn run(app: &AppContext, args: &NamesArgs) -> Result<()> {
    let settings = config_service::resolve_settings(&app.config_store, &(&args.env).into())?;
    let names = StackBuilder::new(&settings).names();

    if app.is_json() {
        return json::print(&names);
    }
    for (key, value) in names.entries() {
        // Plain `key=value` lines; cleanup scripts parse this.
        println!("{key}={value}");
    }
    Ok(())
}
