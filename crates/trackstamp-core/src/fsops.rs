//! Non-destructive filesystem primitives.
//!
//! Copies and rewrites stage their bytes in a temp file next to the
//! destination and publish with a rename, so an interrupted run never leaves
//! a truncated file under a final name.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{WorkflowError, WorkflowResult};

/// Result of [`copy_if_missing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    AlreadyPresent,
}

/// Creates `path` and its parents. Returns true when it did not exist.
pub fn ensure_dir(path: &Path) -> WorkflowResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| WorkflowError::io(path, e))?;
    debug!(path = %path.display(), "created directory");
    Ok(true)
}

/// Copies `src` to `dst` unless `dst` already exists.
///
/// An existing destination is never touched. If another writer publishes
/// `dst` while the copy is staged, that file wins and the outcome is
/// [`CopyOutcome::AlreadyPresent`].
pub fn copy_if_missing(src: &Path, dst: &Path) -> WorkflowResult<CopyOutcome> {
    if dst.exists() {
        debug!(dst = %dst.display(), "destination exists; not copying");
        return Ok(CopyOutcome::AlreadyPresent);
    }

    let mut staged = stage_in(dst)?;
    let mut reader = File::open(src).map_err(|e| WorkflowError::io(src, e))?;
    io::copy(&mut reader, staged.as_file_mut()).map_err(|e| WorkflowError::io(src, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| WorkflowError::io(staged.path(), e))?;

    match staged.persist_noclobber(dst) {
        Ok(_) => {
            debug!(src = %src.display(), dst = %dst.display(), "copied");
            Ok(CopyOutcome::Copied)
        }
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(CopyOutcome::AlreadyPresent)
        }
        Err(e) => Err(WorkflowError::io(dst, e.error)),
    }
}

/// Moves `src` to `dst`, replacing any existing file at `dst`.
///
/// Falls back to copy-then-remove when a rename is not possible, e.g.
/// across volumes.
pub fn move_replacing(src: &Path, dst: &Path) -> WorkflowResult<()> {
    if fs::rename(src, dst).is_ok() {
        debug!(src = %src.display(), dst = %dst.display(), "moved");
        return Ok(());
    }

    let mut staged = stage_in(dst)?;
    let mut reader = File::open(src).map_err(|e| WorkflowError::io(src, e))?;
    io::copy(&mut reader, staged.as_file_mut()).map_err(|e| WorkflowError::io(src, e))?;
    drop(reader);
    staged.persist(dst).map_err(|e| WorkflowError::io(dst, e.error))?;
    fs::remove_file(src).map_err(|e| WorkflowError::io(src, e))?;
    debug!(src = %src.display(), dst = %dst.display(), "moved by copy");
    Ok(())
}

/// Writes `contents` to `path` only if nothing exists there yet.
///
/// Returns true when the file was created.
pub fn write_if_absent(path: &Path, contents: &str) -> WorkflowResult<bool> {
    let file = OpenOptions::new().write(true).create_new(true).open(path);
    match file {
        Ok(mut file) => {
            file.write_all(contents.as_bytes())
                .map_err(|e| WorkflowError::io(path, e))?;
            debug!(path = %path.display(), "wrote new file");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(WorkflowError::io(path, e)),
    }
}

/// Replaces `path` with `contents` via a staged temp file.
pub fn write_replacing(path: &Path, contents: &str) -> WorkflowResult<()> {
    let mut staged = stage_in(path)?;
    staged
        .write_all(contents.as_bytes())
        .map_err(|e| WorkflowError::io(staged.path(), e))?;
    staged.persist(path).map_err(|e| WorkflowError::io(path, e.error))?;
    Ok(())
}

/// Files directly inside `dir` whose extension satisfies `accept`, in
/// filename order. A missing directory yields an empty list.
pub fn files_with_extension(
    dir: &Path,
    accept: impl Fn(&str) -> bool,
) -> WorkflowResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            WorkflowError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(&accept);
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The most recently modified file among `files`; ties go to the later name.
pub fn newest(files: Vec<PathBuf>) -> WorkflowResult<Option<PathBuf>> {
    let mut best: Option<(std::time::SystemTime, PathBuf)> = None;
    for path in files {
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| WorkflowError::io(&path, e))?;
        let better = best.as_ref().map_or(true, |(t, _)| modified >= *t);
        if better {
            best = Some((modified, path));
        }
    }
    Ok(best.map(|(_, path)| path))
}

fn stage_in(dst: &Path) -> WorkflowResult<NamedTempFile> {
    let parent = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    tempfile::Builder::new()
        .prefix(".trackstamp-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| WorkflowError::io(parent, e))
}
