//! A project directory and the names derived from it.

use std::path::{Path, PathBuf};

use crate::error::{WorkflowError, WorkflowResult};
use crate::naming::{slug_from_name, title_from_name};

/// A production project rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    dir_name: String,
    slug: String,
    title: String,
}

impl Project {
    /// Describes the project rooted at `root`.
    ///
    /// Fails when `root` has no final component to derive a slug from.
    pub fn at(root: impl Into<PathBuf>) -> WorkflowResult<Self> {
        let root = root.into();
        let dir_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| WorkflowError::InvalidProjectDir { path: root.clone() })?;

        Ok(Self {
            slug: slug_from_name(&dir_name),
            title: title_from_name(&dir_name),
            dir_name,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Uppercase filename prefix.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Resolves a `/`-separated path relative to the project root.
    pub fn path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}
