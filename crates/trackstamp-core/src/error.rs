//! Error types for trackstamp operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::transcode::TranscodeError;

/// Result type for trackstamp operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur while scaffolding projects or placing artifacts.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A time token did not match `HHMM` followed by `A` or `P`.
    #[error("Invalid {label} '{token}': expected four digits followed by A or P (e.g. 0115P)")]
    InvalidTimeToken { label: &'static str, token: String },

    /// No ancestor of the starting path contains the project marker.
    #[error("No project root found above {}: no ancestor contains a '{marker}' directory. Run from inside a project or pass --root <DIR>", start.display())]
    RootNotFound { start: PathBuf, marker: String },

    /// A required input file or directory is missing.
    #[error("{what} not found: {}", path.display())]
    SourceNotFound { what: &'static str, path: PathBuf },

    /// Numbered masters start at 1.
    #[error("Master number must be 1 or greater, got {version}")]
    InvalidVersion { version: u32 },

    /// The path cannot name a project (no final component, e.g. `/`).
    #[error("Not a usable project directory: {}", path.display())]
    InvalidProjectDir { path: PathBuf },

    /// The external encoder failed or is missing.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Configuration file could not be read or is inconsistent.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Metadata record could not be serialized or parsed.
    #[error("Metadata error for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem error on a specific path.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    /// Creates an IO error tagged with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a source-not-found error.
    pub fn source_not_found(what: &'static str, path: impl AsRef<Path>) -> Self {
        Self::SourceNotFound {
            what,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns a stable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTimeToken { .. } => "TS_001",
            WorkflowError::RootNotFound { .. } => "TS_002",
            WorkflowError::SourceNotFound { .. } => "TS_003",
            WorkflowError::Transcode(TranscodeError::ToolMissing { .. }) => "TS_004",
            WorkflowError::Transcode(_) => "TS_005",
            WorkflowError::InvalidVersion { .. } => "TS_006",
            WorkflowError::InvalidProjectDir { .. } => "TS_007",
            WorkflowError::Config { .. } => "TS_008",
            WorkflowError::Metadata { .. } => "TS_009",
            WorkflowError::Io { .. } => "TS_010",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::InvalidTimeToken {
            label: "suffix",
            token: "1:15P".to_string(),
        };
        assert!(err.to_string().contains("'1:15P'"));

        let err = WorkflowError::RootNotFound {
            start: PathBuf::from("/tmp/loose"),
            marker: "ableton".to_string(),
        };
        assert!(err.to_string().contains("--root"));
        assert!(err.to_string().contains("ableton"));

        let err = WorkflowError::source_not_found("Numbered master", "/p/masters/X-3.wav");
        assert_eq!(err.to_string(), "Numbered master not found: /p/masters/X-3.wav");
    }

    #[test]
    fn test_error_codes() {
        let missing = WorkflowError::Transcode(TranscodeError::ToolMissing {
            tool: "lame".to_string(),
            hint: "install it".to_string(),
        });
        assert_eq!(missing.code(), "TS_004");

        let failed = WorkflowError::Transcode(TranscodeError::Failed {
            tool: "lame".to_string(),
            exit_code: 1,
            stderr: String::new(),
        });
        assert_eq!(failed.code(), "TS_005");
        assert_eq!(WorkflowError::InvalidVersion { version: 0 }.code(), "TS_006");
    }
}
