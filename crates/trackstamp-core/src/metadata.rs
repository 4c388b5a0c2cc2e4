//! The per-project metadata record.
//!
//! `project.json` is rewritten on every scaffold pass so paths and version
//! stay current. The `created` stamp is carried over from the previous
//! record when one can be read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::fsops::write_replacing;
use crate::naming::ArtifactKind;
use crate::project::Project;

/// Version of the tool that last wrote the record.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Structured metadata stored at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Human-readable title.
    pub name: String,
    /// Filename prefix used by every artifact.
    pub slug: String,
    /// Tool version that wrote this record.
    pub version: String,
    /// RFC 3339 timestamp of the first scaffold.
    pub created: String,
    /// Category name → absolute path.
    pub paths: BTreeMap<String, PathBuf>,
    /// Convention name → filename template.
    pub conventions: BTreeMap<String, String>,
}

impl ProjectMetadata {
    /// Builds the record for `project` under `config`.
    pub fn build(project: &Project, config: &WorkflowConfig, created: String) -> Self {
        let paths = config
            .taxonomy
            .iter()
            .map(|c| (c.name.clone(), project.path(&c.name)))
            .collect();
        let conventions = ArtifactKind::conventions()
            .iter()
            .map(|(key, template)| (key.to_string(), template.to_string()))
            .collect();

        Self {
            name: project.title().to_string(),
            slug: project.slug().to_string(),
            version: TOOL_VERSION.to_string(),
            created,
            paths,
            conventions,
        }
    }

    /// Reads a record. Returns `None` when the file does not exist.
    pub fn read(path: &Path) -> WorkflowResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorkflowError::io(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| WorkflowError::Metadata {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Serializes to pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> WorkflowResult<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(|source| {
            WorkflowError::Metadata {
                path: PathBuf::from(&self.slug),
                source,
            }
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Rewrites the record for `project`, keeping the previous `created`
    /// stamp. An unreadable previous record is replaced.
    pub fn refresh(project: &Project, config: &WorkflowConfig) -> WorkflowResult<Self> {
        let path = project.root().join(&config.files.metadata);
        let created = match Self::read(&path) {
            Ok(Some(previous)) => previous.created,
            Ok(None) => now_rfc3339(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "replacing unreadable metadata");
                now_rfc3339()
            }
        };

        let metadata = Self::build(project, config, created);
        write_replacing(&path, &metadata.to_json_pretty()?)?;
        Ok(metadata)
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
