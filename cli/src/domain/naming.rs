//! Deployment suffix and environment-scoped resource names.
//!
//! Pure functions only. No I/O or environment access.

use serde::{Deserialize, Serialize};

// ── Base names ───────────────────────────────────────────────────────────────

pub const STACK_BASE_NAME: &str = "lumigo-java-distro-itests";
pub const VPC_BASE_NAME: &str = "JavaagentFargateTestVpc";
pub const CLUSTER_BASE_NAME: &str = "JavaagentFargateTestCluster";
pub const LOG_GROUP_BASE_NAME: &str = "JavaagentFargateTestLogGroup";

/// Stack tag carrying the deployment suffix.
pub const SUFFIX_TAG: &str = "lumigo:suffix";

// ── Suffix ───────────────────────────────────────────────────────────────────

/// Optional qualifier that lets parallel deployments share one account.
///
/// Absent, empty and whitespace-only input all mean "no suffix". Leading `-`
/// separators are stripped so `"-pr-42"` and `"pr-42"` name the same
/// deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub struct DeploymentSuffix(Option<String>);

impl DeploymentSuffix {
    /// Normalise a raw suffix as supplied by a flag, env var or settings file.
    #[must_use]
    pub fn new(raw: Option<&str>) -> Self {
        let cleaned = raw
            .map(|s| s.trim().trim_start_matches('-').trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Self(cleaned)
    }

    /// The normalised suffix, without separator.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Qualify `base` with the suffix: `X` stays `X`, or becomes `X-<suffix>`.
    #[must_use]
    pub fn apply(&self, base: &str) -> String {
        match &self.0 {
            Some(suffix) => format!("{base}-{suffix}"),
            None => base.to_string(),
        }
    }
}

impl From<Option<String>> for DeploymentSuffix {
    fn from(raw: Option<String>) -> Self {
        Self::new(raw.as_deref())
    }
}

impl From<DeploymentSuffix> for Option<String> {
    fn from(suffix: DeploymentSuffix) -> Self {
        suffix.0
    }
}

// ── Resolved names ───────────────────────────────────────────────────────────

/// Every uniquely-named, environment-scoped resource of the stack.
///
/// Logical ids (task definition, service, secret import, container) are
/// environment-agnostic and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNames {
    pub stack: String,
    pub vpc: String,
    pub cluster: String,
    pub log_group: String,
}

impl ResourceNames {
    #[must_use]
    pub fn resolve(suffix: &DeploymentSuffix) -> Self {
        Self {
            stack: suffix.apply(STACK_BASE_NAME),
            vpc: suffix.apply(VPC_BASE_NAME),
            cluster: suffix.apply(CLUSTER_BASE_NAME),
            log_group: suffix.apply(LOG_GROUP_BASE_NAME),
        }
    }

    /// Names in a stable order, for display.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("stack", self.stack.as_str()),
            ("vpc", self.vpc.as_str()),
            ("cluster", self.cluster.as_str()),
            ("log_group", self.log_group.as_str()),
        ]
    }
}
