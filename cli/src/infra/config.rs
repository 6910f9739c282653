//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::StackSettings;
use crate::domain::error::ConfigError;

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "itest-stack.yaml";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Use `explicit` when given (flag or `ITEST_STACK_CONFIG`), otherwise
    /// `itest-stack.yaml` in the working directory.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            path: explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<StackSettings> {
        if !self.path.exists() {
            return Ok(StackSettings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(StackSettings::default());
        }
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}
