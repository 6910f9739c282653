//! Command implementations

pub mod config;
pub mod names;
pub mod synth;
pub mod version;

use clap::Args;

use crate::application::services::config_service::EnvironmentOverrides;

/// Target environment, read from flags or the CDK environment variables.
#[derive(Args, Debug, Default, Clone)]
pub struct EnvironmentArgs {
    /// Target AWS account
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    pub account: Option<String>,

    /// Target AWS region
    #[arg(long, env = "CDK_DEFAULT_REGION")]
    pub region: Option<String>,

    /// Suffix appended to environment-scoped resource names
    #[arg(long, env = "DEPLOYMENT_SUFFIX")]
    pub suffix: Option<String>,
}

impl From<&EnvironmentArgs> for EnvironmentOverrides {
    fn from(args: &EnvironmentArgs) -> Self {
        Self {
            account: args.account.clone(),
            region: args.region.clone(),
            suffix: args.suffix.clone(),
        }
    }
}
