//! Artifact lifecycle operations.
//!
//! Every operation follows the same order:
//!
//! 1. parse time tokens and numeric inputs (no I/O yet)
//! 2. check required inputs exist
//! 3. resolve the project root (explicit override first, else upward search)
//! 4. create destination directories
//! 5. copy-if-missing, or move for stems
//!
//! Malformed input therefore never mutates the filesystem.

mod masters;
mod savepoint;
mod stems;

use std::path::{Path, PathBuf};

pub use masters::{FinalMasterRequest, NumberedMasterRequest, UnmasteredRequest};
pub use savepoint::{SavepointOutcome, SavepointRequest};
pub use stems::{SessionStemsRequest, StemPlacement, StemsOutcome, StemsRequest};

use crate::config::WorkflowConfig;
use crate::error::WorkflowResult;
use crate::fsops::{copy_if_missing, ensure_dir, CopyOutcome};
use crate::naming::ArtifactName;
use crate::project::Project;
use crate::root::resolve_project_root;
use crate::transcode::Encoder;

/// How a command finds its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocator {
    /// Path to search upward from when no override is given.
    pub start: PathBuf,
    /// Trusted project root; skips the search entirely.
    pub root_override: Option<PathBuf>,
}

impl ProjectLocator {
    /// Search upward from `start`.
    pub fn from_path(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
            root_override: None,
        }
    }

    /// Use `root` without searching.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            start: root.clone(),
            root_override: Some(root),
        }
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementAction {
    /// Copied to a new destination.
    Copied,
    /// Destination already existed and was left untouched.
    AlreadyPresent,
    /// Moved out of the source directory.
    Moved,
    /// Produced by the encoder.
    Encoded,
}

impl PlacementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementAction::Copied => "copied",
            PlacementAction::AlreadyPresent => "already present",
            PlacementAction::Moved => "moved",
            PlacementAction::Encoded => "encoded",
        }
    }
}

impl From<CopyOutcome> for PlacementAction {
    fn from(outcome: CopyOutcome) -> Self {
        match outcome {
            CopyOutcome::Copied => PlacementAction::Copied,
            CopyOutcome::AlreadyPresent => PlacementAction::AlreadyPresent,
        }
    }
}

/// A source file and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub action: PlacementAction,
}

/// Runs lifecycle operations against a configuration and encoder.
pub struct ArtifactEngine<'a> {
    config: &'a WorkflowConfig,
    encoder: &'a dyn Encoder,
}

impl<'a> ArtifactEngine<'a> {
    pub fn new(config: &'a WorkflowConfig, encoder: &'a dyn Encoder) -> Self {
        Self { config, encoder }
    }

    fn open_project(&self, locator: &ProjectLocator) -> WorkflowResult<Project> {
        let root = resolve_project_root(
            &locator.start,
            locator.root_override.as_deref(),
            &self.config.marker,
        )?;
        Project::at(root)
    }

    /// Copies `source` into `dest_dir` under `name`, keeping the source's
    /// extension.
    fn place_copy(
        &self,
        source: &Path,
        dest_dir: &Path,
        name: ArtifactName<'_>,
    ) -> WorkflowResult<Placement> {
        ensure_dir(dest_dir)?;
        let destination = dest_dir.join(name.file_name(&extension_of(source)));
        let action = copy_if_missing(source, &destination)?.into();
        Ok(Placement {
            source: source.to_path_buf(),
            destination,
            action,
        })
    }
}

/// Extension of `path` as written, without the dot; empty when absent.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}
