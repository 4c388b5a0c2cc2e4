//! Encoder interface for compressed derivatives.
//!
//! The artifact engine never shells out directly; it hands the lossless file
//! to an [`Encoder`]. The `trackstamp-encoder` crate provides the real `lame`
//! implementation, tests substitute a fake.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Constant bitrate used for compressed derivatives.
pub const DEFAULT_BITRATE_KBPS: u32 = 320;

/// Seconds one encode may run before it is killed (10 minutes).
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 600;

/// Errors raised by an encoder.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Encoder executable could not be located.
    #[error("{tool} executable not found. {hint}")]
    ToolMissing { tool: String, hint: String },

    /// Encoder process could not be started.
    #[error("Failed to spawn {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoder exited with a non-zero status.
    #[error("{tool} exited with status {exit_code}: {stderr}")]
    Failed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// Encoder did not finish in time.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// Staging or publishing the output failed.
    #[error("IO error while encoding to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces a compressed derivative of a lossless file.
pub trait Encoder {
    /// Short tool name for messages (e.g. `lame`).
    fn name(&self) -> &str;

    /// Encodes `source` into `destination` at a constant `bitrate_kbps`.
    ///
    /// Implementations must not leave a partial file at `destination` when
    /// they fail.
    fn encode(&self, source: &Path, destination: &Path, bitrate_kbps: u32)
        -> Result<(), TranscodeError>;
}
