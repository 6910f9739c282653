//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::StackSettings;

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Copies the agent artifact into the container build context.
pub trait ArtifactStager {
    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;
    /// Whether both paths resolve to the same file on disk.
    fn is_same_file(&self, a: &Path, b: &Path) -> bool;
    /// Copy `source` to `destination`, creating the destination's parent
    /// directories. Returns the number of bytes copied.
    fn copy_artifact(&self, source: &Path, destination: &Path) -> Result<u64>;
}

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the lowercase hex SHA-256 of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

/// Writes rendered documents (template, asset manifest) to disk.
pub trait OutputWriter {
    /// Write `contents` to `path`, creating parent directories as needed.
    fn write_document(&self, path: &Path, contents: &str) -> Result<()>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading of [`StackSettings`].
pub trait ConfigStore {
    /// Load settings, returning defaults when no settings file exists.
    fn load(&self) -> Result<StackSettings>;
    /// Path of the settings file this store reads.
    fn path(&self) -> PathBuf;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
