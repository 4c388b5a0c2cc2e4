//! Unmastered prints, numbered masters, and FINAL promotion.

use std::path::PathBuf;

use super::savepoint::require_file;
use super::{ArtifactEngine, Placement, ProjectLocator};
use crate::error::{WorkflowError, WorkflowResult};
use crate::naming::{ArtifactKind, ArtifactName, TimeToken};

/// Inputs for [`ArtifactEngine::mark_unmastered`].
#[derive(Debug, Clone)]
pub struct UnmasteredRequest {
    pub locator: ProjectLocator,
    pub from: String,
    pub to: String,
    /// The lossless print.
    pub source: PathBuf,
}

/// Inputs for [`ArtifactEngine::create_numbered_master`].
#[derive(Debug, Clone)]
pub struct NumberedMasterRequest {
    pub locator: ProjectLocator,
    pub from: String,
    pub to: String,
    pub source: PathBuf,
    /// Master number, 1 or greater.
    pub version: u32,
}

/// Inputs for [`ArtifactEngine::promote_final_master`].
#[derive(Debug, Clone)]
pub struct FinalMasterRequest {
    pub locator: ProjectLocator,
    pub from: String,
    pub to: String,
    /// Number of the existing master to promote.
    pub version: u32,
    /// Extension of that master; each lossless extension is tried when
    /// absent.
    pub extension: Option<String>,
}

fn parse_span(from: &str, to: &str) -> WorkflowResult<(TimeToken, TimeToken)> {
    Ok((
        TimeToken::parse_labeled(from, "from")?,
        TimeToken::parse_labeled(to, "to")?,
    ))
}

impl ArtifactEngine<'_> {
    /// Copies a print to `{slug}-{from}-{to}-[unmastered].{ext}`.
    pub fn mark_unmastered(&self, request: &UnmasteredRequest) -> WorkflowResult<Placement> {
        let (from, to) = parse_span(&request.from, &request.to)?;
        require_file("Unmastered print", &request.source)?;

        let project = self.open_project(&request.locator)?;
        self.place_copy(
            &request.source,
            &project.path(&self.config.layout.masters),
            ArtifactName::new(project.slug(), ArtifactKind::Unmastered { from: &from, to: &to }),
        )
    }

    /// Copies a master to `{slug}-{from}-{to}-{n}.{ext}`.
    pub fn create_numbered_master(
        &self,
        request: &NumberedMasterRequest,
    ) -> WorkflowResult<Placement> {
        let (from, to) = parse_span(&request.from, &request.to)?;
        if request.version == 0 {
            return Err(WorkflowError::InvalidVersion {
                version: request.version,
            });
        }
        require_file("Master file", &request.source)?;

        let project = self.open_project(&request.locator)?;
        self.place_copy(
            &request.source,
            &project.path(&self.config.layout.masters),
            ArtifactName::new(
                project.slug(),
                ArtifactKind::NumberedMaster {
                    from: &from,
                    to: &to,
                    version: request.version,
                },
            ),
        )
    }

    /// Copies numbered master `n` to `{slug}-{from}-{to}-FINAL.{ext}`.
    ///
    /// The numbered master must already exist at its deterministic path.
    pub fn promote_final_master(&self, request: &FinalMasterRequest) -> WorkflowResult<Placement> {
        let (from, to) = parse_span(&request.from, &request.to)?;
        if request.version == 0 {
            return Err(WorkflowError::InvalidVersion {
                version: request.version,
            });
        }

        let project = self.open_project(&request.locator)?;
        let masters = project.path(&self.config.layout.masters);
        let numbered = ArtifactName::new(
            project.slug(),
            ArtifactKind::NumberedMaster {
                from: &from,
                to: &to,
                version: request.version,
            },
        );

        let extensions: Vec<&str> = match &request.extension {
            Some(ext) => vec![ext.trim_start_matches('.')],
            None => self
                .config
                .lossless_extensions
                .iter()
                .map(String::as_str)
                .collect(),
        };
        let candidates: Vec<PathBuf> = extensions
            .iter()
            .map(|ext| masters.join(numbered.file_name(ext)))
            .collect();

        let Some(source) = candidates.iter().find(|p| p.is_file()) else {
            let expected = candidates
                .first()
                .cloned()
                .unwrap_or_else(|| masters.join(numbered.stem()));
            return Err(WorkflowError::source_not_found("Numbered master", expected));
        };

        self.place_copy(
            source,
            &masters,
            ArtifactName::new(project.slug(), ArtifactKind::FinalMaster { from: &from, to: &to }),
        )
    }
}
