//! Stem stamping for both session tools.
//!
//! Each lossless file in the source directory is tagged with the part
//! detected from its filename and moved into the stems category. Files that
//! resolve to the same name replace each other; files are processed in
//! filename order, so the last one wins.

use std::path::{Path, PathBuf};

use super::{extension_of, ArtifactEngine, Placement, PlacementAction, ProjectLocator};
use crate::error::{WorkflowError, WorkflowResult};
use crate::fsops::{ensure_dir, files_with_extension, move_replacing};
use crate::naming::{ArtifactKind, ArtifactName, TimeToken};
use crate::project::Project;

/// Inputs for [`ArtifactEngine::stamp_stems`] (primary session tool).
#[derive(Debug, Clone)]
pub struct StemsRequest {
    pub locator: ProjectLocator,
    /// Time token; the current time when absent.
    pub suffix: Option<String>,
    /// Directory holding the exported stems; the project's scratch
    /// directory when absent.
    pub source: Option<PathBuf>,
}

/// Inputs for [`ArtifactEngine::stamp_session_stems`] (secondary session tool).
#[derive(Debug, Clone)]
pub struct SessionStemsRequest {
    pub locator: ProjectLocator,
    pub from: String,
    pub to: String,
    /// Directory holding the exported stems.
    pub source: PathBuf,
}

/// One moved stem and the part it was tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemPlacement {
    pub part: String,
    pub placement: Placement,
}

/// Result of a stem stamping run.
#[derive(Debug, Clone)]
pub struct StemsOutcome {
    pub project: Project,
    pub source_dir: PathBuf,
    /// Empty when the source directory held no lossless files.
    pub stems: Vec<StemPlacement>,
}

impl ArtifactEngine<'_> {
    /// Moves stems to `{slug}-{token}-{PART}.{ext}` in the primary stems
    /// directory.
    pub fn stamp_stems(&self, request: &StemsRequest) -> WorkflowResult<StemsOutcome> {
        let token = match &request.suffix {
            Some(suffix) => TimeToken::parse(suffix)?,
            None => TimeToken::now(),
        };
        if let Some(source) = &request.source {
            require_dir(source)?;
        }

        let project = self.open_project(&request.locator)?;
        let source_dir = match &request.source {
            Some(source) => source.clone(),
            None => project.path(&self.config.layout.scratch),
        };
        require_dir(&source_dir)?;

        let dest_dir = project.path(&self.config.layout.stems_primary);
        let slug = project.slug().to_string();
        let stems = self.move_stems(&source_dir, &dest_dir, |part| {
            ArtifactName::new(&slug, ArtifactKind::Stem { token: &token, part }).stem()
        })?;

        Ok(StemsOutcome {
            project,
            source_dir,
            stems,
        })
    }

    /// Moves stems to `{slug}-{from}-{to}-{PART}.{ext}` in the secondary
    /// stems directory.
    pub fn stamp_session_stems(&self, request: &SessionStemsRequest) -> WorkflowResult<StemsOutcome> {
        let from = TimeToken::parse_labeled(&request.from, "from")?;
        let to = TimeToken::parse_labeled(&request.to, "to")?;
        require_dir(&request.source)?;

        let project = self.open_project(&request.locator)?;
        let dest_dir = project.path(&self.config.layout.stems_secondary);
        let slug = project.slug().to_string();
        let stems = self.move_stems(&request.source, &dest_dir, |part| {
            ArtifactName::new(
                &slug,
                ArtifactKind::SessionStem {
                    from: &from,
                    to: &to,
                    part,
                },
            )
            .stem()
        })?;

        Ok(StemsOutcome {
            project,
            source_dir: request.source.clone(),
            stems,
        })
    }

    fn move_stems(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        stem_for: impl Fn(&str) -> String,
    ) -> WorkflowResult<Vec<StemPlacement>> {
        let config = self.config;
        let files = files_with_extension(source_dir, |ext| config.is_lossless(ext))?;
        if files.is_empty() {
            return Ok(Vec::new());
        }
        ensure_dir(dest_dir)?;

        let mut stems = Vec::with_capacity(files.len());
        for source in files {
            let file_stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let part = config.parts.detect(&file_stem).to_string();
            let destination = dest_dir.join(format!(
                "{}.{}",
                stem_for(&part),
                extension_of(&source)
            ));

            move_replacing(&source, &destination)?;
            stems.push(StemPlacement {
                part,
                placement: Placement {
                    source,
                    destination,
                    action: PlacementAction::Moved,
                },
            });
        }
        Ok(stems)
    }
}

fn require_dir(path: &Path) -> WorkflowResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(WorkflowError::source_not_found("Stem source directory", path))
    }
}
