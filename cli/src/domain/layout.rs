//! Relative addressing of the agent artifact and the container build context.
//!
//! Path arithmetic only; nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the pre-built agent jar lives relative to the stack directory, and
/// where it must be staged for the container image build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactLayout {
    /// How many parent directories above the stack directory the repository
    /// root sits.
    pub artifact_depth: usize,
    /// Jar path relative to that repository root.
    pub artifact_relpath: PathBuf,
    /// Container build context relative to the stack directory.
    pub container_context: PathBuf,
    /// Staged jar path relative to the container build context.
    pub staged_relpath: PathBuf,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            artifact_depth: 4,
            artifact_relpath: ["agent", "build", "libs", "agent-dev-SNAPSHOT-all.jar"]
                .iter()
                .collect(),
            container_context: ["containers", "server"].iter().collect(),
            staged_relpath: ["distro", "lumigo-opentelemetry-distro.jar"].iter().collect(),
        }
    }
}

impl ArtifactLayout {
    /// Source jar: `artifact_depth` parents above `stack_dir`, joined with
    /// `artifact_relpath`. Walking past the filesystem root stops at the root.
    #[must_use]
    pub fn source_artifact(&self, stack_dir: &Path) -> PathBuf {
        let root = stack_dir
            .ancestors()
            .nth(self.artifact_depth)
            .or_else(|| stack_dir.ancestors().last())
            .unwrap_or(stack_dir);
        root.join(&self.artifact_relpath)
    }

    /// Container build context directory.
    #[must_use]
    pub fn context_dir(&self, stack_dir: &Path) -> PathBuf {
        stack_dir.join(&self.container_context)
    }

    /// Destination of the staged jar inside the build context.
    #[must_use]
    pub fn staged_artifact(&self, stack_dir: &Path) -> PathBuf {
        self.context_dir(stack_dir).join(&self.staged_relpath)
    }
}

/// Proof that the agent jar has been copied into the build context.
///
/// The task definition's image can only be declared from one of these, so a
/// stack cannot be composed before staging has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
    pub context_dir: PathBuf,
    pub staged_path: PathBuf,
    /// Lowercase hex SHA-256 of the staged jar.
    pub sha256: String,
}

impl StagedArtifact {
    #[must_use]
    pub fn new(context_dir: PathBuf, staged_path: PathBuf, sha256: String) -> Self {
        Self {
            context_dir,
            staged_path,
            sha256,
        }
    }
}
