//! Domain types for stack settings.
//!
//! Pure data with defaults. Environment variables and flags are folded in
//! once, at the CLI boundary.

use serde::{Deserialize, Serialize};

use crate::domain::layout::ArtifactLayout;
use crate::domain::naming::DeploymentSuffix;
use crate::domain::network::NetworkSettings;

// ── Constants ────────────────────────────────────────────────────────────────

/// Sentinel used wherever a region is required but none was supplied.
pub const UNKNOWN_REGION: &str = "unknown_region";

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/greeting";

// ── Settings schema ──────────────────────────────────────────────────────────

/// Everything the stack builder needs, stored in `itest-stack.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StackSettings {
    pub environment: EnvironmentDescriptor,
    pub secret: SecretReference,
    pub container: ContainerSettings,
    pub service: ServiceSettings,
    pub health_check: HealthCheckSettings,
    pub network: NetworkSettings,
    pub artifact: ArtifactLayout,
}

/// Target account, region and deployment suffix.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EnvironmentDescriptor {
    pub account: Option<String>,
    pub region: Option<String>,
    pub suffix: DeploymentSuffix,
}

impl EnvironmentDescriptor {
    /// The region, or [`UNKNOWN_REGION`] when absent or blank.
    #[must_use]
    pub fn region_or_unknown(&self) -> &str {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNKNOWN_REGION)
    }

    /// The account, if one was supplied and is not blank.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

/// Handle to a key inside a Secrets Manager secret. Never holds the value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecretReference {
    /// Name of the secret in the secret store.
    pub secret_name: String,
    /// Key inside the secret's JSON document.
    pub json_key: String,
    /// Container variable the value is injected into.
    pub env_var: String,
}

impl Default for SecretReference {
    fn default() -> Self {
        Self {
            secret_name: "AccessKeys".to_string(),
            json_key: "LumigoToken".to_string(),
            env_var: "LUMIGO_TRACER_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContainerSettings {
    /// Port the server listens on; also the listener and health-check port.
    pub server_port: u16,
    pub memory_reservation_mib: u32,
    /// Value of `LUMIGO_DEBUG_SPANDUMP`.
    pub debug_spandump: String,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            memory_reservation_mib: 256,
            debug_spandump: "/dev/stdout".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceSettings {
    pub desired_count: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { desired_count: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckSettings {
    pub path: String,
    pub interval_secs: u32,
    pub unhealthy_threshold: u32,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_HEALTH_CHECK_PATH.to_string(),
            interval_secs: 60,
            unhealthy_threshold: 10,
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
