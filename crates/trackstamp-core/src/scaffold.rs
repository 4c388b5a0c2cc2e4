//! Project scaffolding.
//!
//! Scaffolding is additive and safe to re-run: directories are created when
//! missing, the README is written once, the `.gitignore` only gains lines,
//! the metadata record is refreshed, and a marker file records the first
//! pass.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::fsops::{ensure_dir, write_if_absent, write_replacing};
use crate::metadata::{now_rfc3339, ProjectMetadata};
use crate::naming::ArtifactKind;
use crate::project::Project;
use crate::root::normalize_path;

/// A project that failed to scaffold during a batch run.
#[derive(Debug)]
pub struct ProjectFailure {
    pub path: PathBuf,
    pub error: WorkflowError,
}

/// Result of scaffolding every project under a base directory.
#[derive(Debug, Default)]
pub struct ScaffoldSummary {
    /// Candidate directories that were scaffolded (new or already marked).
    pub scaffolded: Vec<PathBuf>,
    /// Projects whose marker was created on this pass.
    pub newly_marked: Vec<PathBuf>,
    /// Projects that failed; the rest of the batch still ran.
    pub failures: Vec<ProjectFailure>,
}

impl ScaffoldSummary {
    pub fn new_count(&self) -> usize {
        self.newly_marked.len()
    }
}

/// Applies the configured taxonomy to project directories.
#[derive(Debug, Clone, Copy)]
pub struct Scaffolder<'a> {
    config: &'a WorkflowConfig,
}

impl<'a> Scaffolder<'a> {
    pub fn new(config: &'a WorkflowConfig) -> Self {
        Self { config }
    }

    /// Scaffolds one project directory.
    ///
    /// Paths failing [`is_project_candidate`] are skipped and return
    /// `false`. Otherwise the return value is true only when the marker file
    /// was created by this call, i.e. the project was seen for the first
    /// time; it does not report whether any other step changed something.
    pub fn scaffold(&self, project_dir: &Path) -> WorkflowResult<bool> {
        if !is_project_candidate(project_dir) {
            debug!(path = %project_dir.display(), "not a project candidate");
            return Ok(false);
        }

        let project = Project::at(normalize_path(project_dir))?;
        let root = project.root();

        for dir in self.config.taxonomy_dirs() {
            ensure_dir(&root.join(dir))?;
        }

        let readme = root.join(&self.config.files.readme);
        let content = render_readme(&project, self.config)
            .map_err(|e| WorkflowError::io(&readme, std::io::Error::other(e)))?;
        write_if_absent(&readme, &content)?;

        merge_gitignore(&root.join(&self.config.files.gitignore), &self.config.gitignore)?;

        ProjectMetadata::refresh(&project, self.config)?;

        let created = write_if_absent(
            &root.join(&self.config.files.marker),
            &format!("scaffolded {}\n", now_rfc3339()),
        )?;
        if created {
            info!(project = %project.slug(), "scaffolded new project");
        }
        Ok(created)
    }

    /// Scaffolds every immediate child of `base`, in name order.
    ///
    /// A failure in one project is recorded and logged; the others still run.
    /// Only an unreadable `base` fails the batch.
    pub fn scaffold_all(&self, base: &Path) -> WorkflowResult<ScaffoldSummary> {
        if !base.is_dir() {
            return Err(WorkflowError::source_not_found("Base directory", base));
        }

        let mut summary = ScaffoldSummary::default();
        for entry in WalkDir::new(base)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| WorkflowError::io(base, e.into()))?;
            let path = entry.into_path();
            if !is_project_candidate(&path) {
                continue;
            }

            match self.scaffold(&path) {
                Ok(created) => {
                    if created {
                        summary.newly_marked.push(path.clone());
                    }
                    summary.scaffolded.push(path);
                }
                Err(error) => {
                    warn!(project = %path.display(), %error, "scaffold failed");
                    summary.failures.push(ProjectFailure { path, error });
                }
            }
        }
        Ok(summary)
    }
}

/// True for an existing directory whose resolved name does not start with
/// a dot.
pub fn is_project_candidate(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    normalize_path(path)
        .file_name()
        .map(|n| !n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Ensures every default line is present in the ignore file.
///
/// Returns the lines that were added. Existing content is kept verbatim.
pub fn merge_gitignore(path: &Path, defaults: &[String]) -> WorkflowResult<Vec<String>> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(WorkflowError::io(path, e)),
    };

    let Some(existing) = existing else {
        let mut content = defaults.join("\n");
        content.push('\n');
        write_if_absent(path, &content)?;
        return Ok(defaults.to_vec());
    };

    let (merged, added) = merge_lines(&existing, defaults);
    if !added.is_empty() {
        write_replacing(path, &merged)?;
        debug!(path = %path.display(), added = added.len(), "extended ignore file");
    }
    Ok(added)
}

/// Appends the `defaults` missing from `existing` (exact line match), in
/// order and without duplicates.
fn merge_lines(existing: &str, defaults: &[String]) -> (String, Vec<String>) {
    let mut present: Vec<&str> = existing.lines().collect();
    let mut added = Vec::new();
    for line in defaults {
        if !present.contains(&line.as_str()) {
            present.push(line);
            added.push(line.clone());
        }
    }

    let mut merged = existing.to_string();
    if !added.is_empty() {
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        for line in &added {
            merged.push_str(line);
            merged.push('\n');
        }
    }
    (merged, added)
}

fn render_readme(project: &Project, config: &WorkflowConfig) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {}", project.title())?;
    writeln!(out)?;
    writeln!(out, "Folder: `{}`", project.dir_name())?;
    writeln!(out, "Slug: `{}`", project.slug())?;
    writeln!(out)?;
    writeln!(out, "## Layout")?;
    writeln!(out)?;
    for category in &config.taxonomy {
        if category.subdirs.is_empty() {
            writeln!(out, "- `{}/`", category.name)?;
        } else {
            let subdirs: Vec<String> = category.subdirs.iter().map(|s| format!("`{s}/`")).collect();
            writeln!(out, "- `{}/`: {}", category.name, subdirs.join(", "))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "## Naming")?;
    writeln!(out)?;
    for (key, template) in ArtifactKind::conventions() {
        writeln!(out, "- {}: `{}`", key.replace('_', " "), template)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn defaults(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_lines_appends_missing_in_order() {
        let (merged, added) = merge_lines("*.wav\nmy_secret.txt", &defaults(&[".DS_Store", "*.wav", "*.asd"]));
        assert_eq!(merged, "*.wav\nmy_secret.txt\n.DS_Store\n*.asd\n");
        assert_eq!(added, defaults(&[".DS_Store", "*.asd"]));
    }

    #[test]
    fn test_merge_lines_noop_when_complete() {
        let (merged, added) = merge_lines("a\nb\n", &defaults(&["b", "a"]));
        assert_eq!(merged, "a\nb\n");
        assert!(added.is_empty());
    }

    #[test]
    fn test_merge_lines_exact_match_only() {
        let (merged, added) = merge_lines("  *.wav\n", &defaults(&["*.wav"]));
        assert_eq!(merged, "  *.wav\n*.wav\n");
        assert_eq!(added.len(), 1);
    }

    #[test]
    fn test_merge_lines_dedupes_defaults() {
        let (merged, _) = merge_lines("", &defaults(&["x", "x"]));
        assert_eq!(merged, "x\n");
    }

    #[test]
    fn test_scaffold_creates_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("MY_TRACK");
        fs::create_dir(&dir).unwrap();
        let config = WorkflowConfig::default();

        assert!(Scaffolder::new(&config).scaffold(&dir).unwrap());

        for rel in config.taxonomy_dirs() {
            assert!(dir.join(&rel).is_dir(), "missing {}", rel.display());
        }
        let readme = fs::read_to_string(dir.join("README.md")).unwrap();
        assert!(readme.starts_with("# MY TRACK\n"));
        assert!(readme.contains("{slug}-{from}-{to}-[unmastered].{ext}"));
        assert!(dir.join(".trackstamp").is_file());
    }

    #[test]
    fn test_render_readme() {
        let config = WorkflowConfig::default();
        let project = Project::at("/music/beat_01").unwrap();

        let readme = render_readme(&project, &config).unwrap();
        assert!(readme.starts_with("# Beat 01\n\nFolder: `beat_01`\nSlug: `BEAT_01`\n"));
        assert!(readme.contains("- `ableton/`: `sets/`, `bounces/`, `samples/`\n"));
        assert!(readme.contains("- `notes/`\n"));
        assert!(readme.ends_with("`\n"));
    }

    #[test]
    fn test_scaffold_second_pass_reports_not_new() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("beat_01");
        fs::create_dir(&dir).unwrap();
        let config = WorkflowConfig::default();
        let scaffolder = Scaffolder::new(&config);

        assert!(scaffolder.scaffold(&dir).unwrap());
        fs::remove_dir_all(dir.join("masters")).unwrap();

        assert!(!scaffolder.scaffold(&dir).unwrap());
        assert!(dir.join("masters").is_dir(), "structure is repaired on rerun");
    }

    #[test]
    fn test_scaffold_skips_hidden_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let hidden = tmp.path().join(".cache");
        let file = tmp.path().join("notes.txt");
        fs::create_dir(&hidden).unwrap();
        fs::write(&file, "x").unwrap();
        let config = WorkflowConfig::default();
        let scaffolder = Scaffolder::new(&config);

        assert!(!scaffolder.scaffold(&hidden).unwrap());
        assert!(!scaffolder.scaffold(&file).unwrap());
        assert!(!hidden.join("ableton").exists());
    }

    #[test]
    fn test_project_candidate() {
        let tmp = tempfile::tempdir().unwrap();
        let song = tmp.path().join("song");
        let hidden = tmp.path().join(".cache");
        fs::create_dir(&song).unwrap();
        fs::create_dir(&hidden).unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        assert!(is_project_candidate(&song));
        assert!(is_project_candidate(&song.join(".")));
        assert!(is_project_candidate(&hidden.join("..").join("song")));
        assert!(!is_project_candidate(&hidden));
        assert!(!is_project_candidate(&song.join("..").join(".cache")));
        assert!(!is_project_candidate(&tmp.path().join("notes.txt")));
        assert!(!is_project_candidate(&tmp.path().join("missing")));
    }

    #[test]
    fn test_scaffold_parent_component_uses_real_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("MY_TRACK");
        fs::create_dir_all(dir.join("notes")).unwrap();
        let config = WorkflowConfig::default();

        assert!(Scaffolder::new(&config).scaffold(&dir.join("notes").join("..")).unwrap());
        let readme = fs::read_to_string(dir.join("README.md")).unwrap();
        assert!(readme.starts_with("# MY TRACK\n"));
    }

    #[test]
    fn test_scaffold_all_counts_new_projects() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b_song", "a_song", ".git"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        fs::write(tmp.path().join("loose.wav"), b"x").unwrap();
        let config = WorkflowConfig::default();
        let scaffolder = Scaffolder::new(&config);

        let first = scaffolder.scaffold_all(tmp.path()).unwrap();
        assert_eq!(
            first.newly_marked,
            vec![tmp.path().join("a_song"), tmp.path().join("b_song")]
        );
        assert!(first.failures.is_empty());

        let second = scaffolder.scaffold_all(tmp.path()).unwrap();
        assert_eq!(second.new_count(), 0);
        assert_eq!(second.scaffolded.len(), 2);
    }

    #[test]
    fn test_scaffold_all_isolates_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("broken");
        let fine = tmp.path().join("fine");
        fs::create_dir(&broken).unwrap();
        fs::create_dir(&fine).unwrap();
        // A file where the `ableton` directory should go.
        fs::write(broken.join("ableton"), b"not a dir").unwrap();
        let config = WorkflowConfig::default();

        let summary = Scaffolder::new(&config).scaffold_all(tmp.path()).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, broken);
        assert_eq!(summary.newly_marked, vec![fine]);
    }

    #[test]
    fn test_scaffold_all_missing_base() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let err = Scaffolder::new(&config)
            .scaffold_all(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::SourceNotFound { .. }));
    }
}
