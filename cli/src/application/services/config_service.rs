//! Application service — settings use-cases.

use anyhow::Result;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::StackSettings;
use crate::domain::naming::DeploymentSuffix;

/// Values supplied at the CLI boundary (flags or environment variables).
///
/// `None` leaves the settings-file value in place.
#[derive(Debug, Default, Clone)]
pub struct EnvironmentOverrides {
    pub account: Option<String>,
    pub region: Option<String>,
    pub suffix: Option<String>,
}

/// Load settings from the store.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be read or parsed.
pub fn load_settings(store: &impl ConfigStore) -> Result<StackSettings> {
    let settings = store.load()?;
    debug!(path = %store.path().display(), "loaded stack settings");
    Ok(settings)
}

/// Fold boundary overrides into `settings`. Flags and environment variables
/// win over the settings file.
#[must_use]
pub fn apply_overrides(mut settings: StackSettings, overrides: &EnvironmentOverrides) -> StackSettings {
    if let Some(account) = &overrides.account {
        settings.environment.account = Some(account.clone());
    }
    if let Some(region) = &overrides.region {
        settings.environment.region = Some(region.clone());
    }
    if let Some(suffix) = &overrides.suffix {
        settings.environment.suffix = DeploymentSuffix::new(Some(suffix));
    }
    debug!(
        account = settings.environment.account().unwrap_or("-"),
        region = settings.environment.region_or_unknown(),
        suffix = settings.environment.suffix.as_str().unwrap_or("-"),
        "resolved environment"
    );
    settings
}

/// Load settings and apply boundary overrides in one step.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be read or parsed.
pub fn resolve_settings(
    store: &impl ConfigStore,
    overrides: &EnvironmentOverrides,
) -> Result<StackSettings> {
    Ok(apply_overrides(load_settings(store)?, overrides))
}
