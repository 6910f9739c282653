//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::network::SubnetRole;

// ── Stack errors ──────────────────────────────────────────────────────────────

/// Errors that abort stack composition before any declaration is produced.
#[derive(Debug, Error)]
pub enum StackError {
    #[error(
        "Agent artifact not found at {}. Build the agent jar before running 'itest-stack synth'.",
        path.display()
    )]
    ArtifactMissing { path: PathBuf },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

// ── Network errors ────────────────────────────────────────────────────────────

/// Errors raised while validating or carving up the VPC address block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR block '{0}': expected a.b.c.d/n with n <= 32")]
    InvalidCidr(String),

    #[error("Subnet mask /{mask} must be at least as narrow as the VPC mask /{vpc_mask}")]
    MaskTooWide { mask: u8, vpc_mask: u8 },

    #[error("VPC block {cidr} has no room left for a /{mask} subnet ({allocated} allocated)")]
    Exhausted {
        cidr: String,
        mask: u8,
        allocated: usize,
    },

    #[error("Network must span at least one availability zone")]
    NoAvailabilityZones,

    #[error("Network has no {0} subnet configuration")]
    MissingRole(SubnetRole),

    #[error("Subnet configuration '{0}' is declared more than once")]
    DuplicateSubnet(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot parse settings file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}
