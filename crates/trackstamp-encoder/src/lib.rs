//! trackstamp MP3 encoder backend
//!
//! Produces compressed derivatives of lossless bounces by running the `lame`
//! encoder as a subprocess at a constant bitrate.
//!
//! # Locating lame
//!
//! 1. [`EncoderConfig::lame_path`], when it exists
//! 2. the `TRACKSTAMP_LAME` environment variable, when it exists
//! 3. `lame` on `PATH`
//! 4. common install locations (Homebrew, `/usr/local/bin`, `/usr/bin`)
//!
//! # Output safety
//!
//! lame writes into a temp file beside the destination; the file is renamed
//! into place only after a zero exit, so a failed or timed-out run never
//! leaves a truncated MP3 behind.

pub mod lame;
mod process;

pub use lame::{EncoderConfig, LameEncoder, DEFAULT_TIMEOUT_SECS, LAME_PATH_ENV};
