//! Domain layer — pure stack model, naming, and rendering.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::env`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod layout;
pub mod naming;
pub mod network;
pub mod stack;
pub mod template;

pub use config::{EnvironmentDescriptor, SecretReference, StackSettings, UNKNOWN_REGION};
pub use error::{ConfigError, NetworkError, StackError};
pub use layout::{ArtifactLayout, StagedArtifact};
pub use naming::{DeploymentSuffix, ResourceNames};
pub use stack::{DeploymentStack, StackBuilder};
