//! Project root discovery.
//!
//! A directory is a project root when it directly contains the marker
//! directory (by default `ableton`). Discovery walks upward from any path,
//! starting with the path itself, and stops at the filesystem root. Paths are
//! resolved against the real filesystem first, so `..` and symlinks lead
//! where the operating system says they do.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{WorkflowError, WorkflowResult};

/// Outcome of an upward root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootLookup {
    /// The nearest ancestor containing the marker.
    Found(PathBuf),
    /// The filesystem root was reached without a match.
    NotFound { searched_from: PathBuf },
}

/// Searches `start` and its ancestors for a directory containing `marker`.
///
/// A file path starts the search at its parent directory. The start path is
/// normalized with [`normalize_path`] before walking.
pub fn find_project_root(start: &Path, marker: &str) -> RootLookup {
    let start = normalize_path(start);
    let first = if start.is_file() {
        start.parent().map(Path::to_path_buf).unwrap_or_else(|| start.clone())
    } else {
        start.clone()
    };

    for dir in first.ancestors() {
        if dir.join(marker).is_dir() {
            debug!(root = %dir.display(), "found project root");
            return RootLookup::Found(dir.to_path_buf());
        }
    }

    RootLookup::NotFound {
        searched_from: start,
    }
}

/// Resolves the project root for an artifact command.
///
/// An explicit `root_override` is trusted without checking for the marker; it
/// is only normalized.
pub fn resolve_project_root(
    start: &Path,
    root_override: Option<&Path>,
    marker: &str,
) -> WorkflowResult<PathBuf> {
    if let Some(root) = root_override {
        return Ok(normalize_path(root));
    }

    match find_project_root(start, marker) {
        RootLookup::Found(root) => Ok(root),
        RootLookup::NotFound { searched_from } => Err(WorkflowError::RootNotFound {
            start: searched_from,
            marker: marker.to_string(),
        }),
    }
}

/// Makes `path` absolute and resolves it against the filesystem.
///
/// The deepest ancestor that exists is canonicalized. Components below it
/// that do not exist yet are appended, with `.` dropped and `..` removing
/// the previous component.
pub fn normalize_path(path: &Path) -> PathBuf {
    let path = absolutize(path);
    for base in path.ancestors() {
        let Ok(mut resolved) = base.canonicalize() else {
            continue;
        };
        let Ok(rest) = path.strip_prefix(base) else {
            continue;
        };
        for component in rest.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                _ => {}
            }
        }
        return resolved;
    }
    path
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
