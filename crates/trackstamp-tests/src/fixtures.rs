//! Test fixture utilities for building project trees.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trackstamp_core::{Encoder, Scaffolder, TranscodeError, WorkflowConfig};
use walkdir::WalkDir;

/// A temporary base directory holding one project directory.
pub struct ProjectFixture {
    pub base: TempDir,
    pub root: PathBuf,
    pub config: WorkflowConfig,
}

impl ProjectFixture {
    /// Creates `<tmp>/<name>` without scaffolding it. `root` is canonical.
    pub fn bare(name: &str) -> Self {
        let base = TempDir::new().expect("Failed to create temp dir");
        let root = base
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir")
            .join(name);
        fs::create_dir(&root).expect("Failed to create project dir");
        Self {
            base,
            root,
            config: WorkflowConfig::default(),
        }
    }

    /// Creates and scaffolds `<tmp>/<name>` with the default config.
    pub fn scaffolded(name: &str) -> Self {
        let fixture = Self::bare(name);
        Scaffolder::new(&fixture.config)
            .scaffold(&fixture.root)
            .expect("Failed to scaffold project");
        fixture
    }

    /// Path of the project root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of a file relative to the project root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes a file relative to the project root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Writes a file outside the project, in the base directory.
    pub fn write_outside(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.base.path().join(name);
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Reads a file relative to the project root.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).expect("Failed to read fixture file")
    }

    /// Every path under the project root, relative and sorted.
    pub fn tree(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|e| {
                let e = e.expect("Failed to walk project");
                e.path()
                    .strip_prefix(&self.root)
                    .expect("walked path outside root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    /// File names directly inside a directory relative to the root, sorted.
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.join(relative))
            .expect("Failed to read dir")
            .map(|e| {
                e.expect("Failed to read entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// One recorded encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCall {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bitrate_kbps: u32,
}

/// Encoder stand-in that writes a placeholder MP3 and records each call.
#[derive(Debug, Default)]
pub struct FakeEncoder {
    calls: RefCell<Vec<EncodeCall>>,
    fail_with_exit: Option<i32>,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder whose every call fails with `exit_code`.
    pub fn failing(exit_code: i32) -> Self {
        Self {
            calls: RefCell::default(),
            fail_with_exit: Some(exit_code),
        }
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.borrow().clone()
    }
}

impl Encoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake-lame"
    }

    fn encode(
        &self,
        source: &Path,
        destination: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), TranscodeError> {
        self.calls.borrow_mut().push(EncodeCall {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            bitrate_kbps,
        });
        if let Some(exit_code) = self.fail_with_exit {
            return Err(TranscodeError::Failed {
                tool: self.name().to_string(),
                exit_code,
                stderr: "simulated failure".to_string(),
            });
        }
        fs::write(destination, b"ID3 fake").map_err(|source| TranscodeError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }
}
