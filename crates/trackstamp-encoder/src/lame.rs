//! The `lame` encoder.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};
use trackstamp_core::config::EncoderSettings;
use trackstamp_core::transcode::{Encoder, TranscodeError, DEFAULT_ENCODE_TIMEOUT_SECS};

use crate::process::{tail, wait_with_timeout, WaitOutcome};

/// Default timeout for one encode.
pub const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_ENCODE_TIMEOUT_SECS;

/// Environment variable pointing at a specific lame binary.
pub const LAME_PATH_ENV: &str = "TRACKSTAMP_LAME";

const TOOL: &str = "lame";

/// Configuration for [`LameEncoder`].
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Explicit path to the lame executable.
    pub lame_path: Option<PathBuf>,
    /// Timeout for one encode.
    pub timeout: Duration,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            lame_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EncoderConfig {
    /// Sets the lame executable path.
    pub fn lame_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lame_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl From<&EncoderSettings> for EncoderConfig {
    fn from(settings: &EncoderSettings) -> Self {
        let config = Self::default().timeout_secs(settings.timeout_secs);
        match &settings.path {
            Some(path) => config.lame_path(path),
            None => config,
        }
    }
}

/// Encodes MP3 derivatives with lame.
#[derive(Debug, Clone, Default)]
pub struct LameEncoder {
    config: EncoderConfig,
}

impl LameEncoder {
    /// Creates an encoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with the given configuration.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Finds the lame executable.
    pub fn locate(&self) -> Result<PathBuf, TranscodeError> {
        if let Some(ref path) = self.config.lame_path {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!(path = %path.display(), "configured lame path does not exist, searching");
        }

        if let Some(path) = std::env::var_os(LAME_PATH_ENV).map(PathBuf::from) {
            if path.exists() {
                return Ok(path);
            }
        }

        if let Ok(path) = which::which(TOOL) {
            return Ok(path);
        }

        let common_paths: &[&str] = if cfg!(windows) {
            &["C:\\Program Files\\LAME\\lame.exe", "C:\\Program Files (x86)\\LAME\\lame.exe"]
        } else {
            &["/opt/homebrew/bin/lame", "/usr/local/bin/lame", "/usr/bin/lame"]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(TranscodeError::ToolMissing {
            tool: TOOL.to_string(),
            hint: format!(
                "Install it (e.g. `brew install lame` or `apt install lame`), put it on PATH, or set {}",
                LAME_PATH_ENV
            ),
        })
    }

    /// Version string reported by `lame --version`, if lame can be run.
    pub fn version(&self) -> Option<String> {
        let path = self.locate().ok()?;
        let output = Command::new(path).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        parse_lame_version(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Arguments for a constant-bitrate encode.
fn encode_args(source: &Path, output: &Path, bitrate_kbps: u32) -> Vec<std::ffi::OsString> {
    vec![
        "--quiet".into(),
        "--cbr".into(),
        "-b".into(),
        bitrate_kbps.to_string().into(),
        source.as_os_str().to_owned(),
        output.as_os_str().to_owned(),
    ]
}

/// Parses "LAME 64bits version 3.100 (http://lame.sf.net)" into "3.100".
fn parse_lame_version(output: &str) -> Option<String> {
    let line = output.lines().next()?;
    let mut words = line.split_whitespace();
    words.find(|w| *w == "version")?;
    words.next().map(|v| v.to_string())
}

impl Encoder for LameEncoder {
    fn name(&self) -> &str {
        TOOL
    }

    fn encode(
        &self,
        source: &Path,
        destination: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), TranscodeError> {
        let lame = self.locate()?;
        let io_err = |path: PathBuf| move |source| TranscodeError::Io { path, source };

        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        // Closed handle, path still removed on drop.
        let staged = tempfile::Builder::new()
            .prefix(".trackstamp-")
            .suffix(".mp3")
            .tempfile_in(parent)
            .map_err(io_err(parent.to_path_buf()))?
            .into_temp_path();

        let mut cmd = Command::new(&lame);
        cmd.args(encode_args(source, &staged, bitrate_kbps))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!(lame = %lame.display(), src = %source.display(), bitrate_kbps, "encoding");

        let child = cmd.spawn().map_err(|source| TranscodeError::SpawnFailed {
            tool: TOOL.to_string(),
            source,
        })?;

        match wait_with_timeout(child, self.config.timeout).map_err(io_err(staged.to_path_buf()))? {
            WaitOutcome::TimedOut => Err(TranscodeError::Timeout {
                tool: TOOL.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            }),
            WaitOutcome::Exited { status, stderr } if !status.success() => {
                Err(TranscodeError::Failed {
                    tool: TOOL.to_string(),
                    exit_code: status.code().unwrap_or(-1),
                    stderr: tail(&stderr, 20),
                })
            }
            WaitOutcome::Exited { .. } => staged
                .persist(destination)
                .map_err(|e| TranscodeError::Io {
                    path: destination.to_path_buf(),
                    source: e.error,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::default()
            .lame_path("/opt/homebrew/bin/lame")
            .timeout_secs(30);
        assert_eq!(config.lame_path, Some(PathBuf::from("/opt/homebrew/bin/lame")));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_settings() {
        let config = EncoderConfig::from(&EncoderSettings::default());
        assert_eq!(config.lame_path, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let settings = EncoderSettings {
            path: Some(PathBuf::from("/usr/local/bin/lame")),
            timeout_secs: 45,
        };
        let config = EncoderConfig::from(&settings);
        assert_eq!(config.lame_path, Some(PathBuf::from("/usr/local/bin/lame")));
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_encode_args() {
        let args = encode_args(Path::new("in.wav"), Path::new("out.mp3"), 320);
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["--quiet", "--cbr", "-b", "320", "in.wav", "out.mp3"]);
    }

    #[test]
    fn test_parse_lame_version() {
        let out = "LAME 64bits version 3.100 (http://lame.sf.net)\n\nCan I use it?\n";
        assert_eq!(parse_lame_version(out).as_deref(), Some("3.100"));
        assert_eq!(parse_lame_version("usage: lame\n"), None);
    }

    #[test]
    fn test_configured_path_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let fake = tmp.path().join("lame");
        std::fs::write(&fake, "").unwrap();

        let encoder = LameEncoder::with_config(EncoderConfig::default().lame_path(&fake));
        assert_eq!(encoder.locate().unwrap(), fake);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-lame");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn leftovers(dir: &Path) -> Vec<String> {
            fs::read_dir(dir)
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .filter(|n| n.starts_with(".trackstamp-"))
                .collect()
        }

        #[test]
        fn test_encode_publishes_on_success() {
            let tmp = tempfile::tempdir().unwrap();
            // Last argument is the output path.
            let lame = script(tmp.path(), r#"for last; do :; done; printf encoded > "$last""#);
            let src = tmp.path().join("mix.wav");
            let dst = tmp.path().join("out").join("mix.mp3");
            fs::write(&src, "pcm").unwrap();
            fs::create_dir(tmp.path().join("out")).unwrap();

            LameEncoder::with_config(EncoderConfig::default().lame_path(&lame))
                .encode(&src, &dst, 320)
                .unwrap();

            assert_eq!(fs::read_to_string(&dst).unwrap(), "encoded");
            assert!(leftovers(&tmp.path().join("out")).is_empty());
        }

        #[test]
        fn test_encode_failure_leaves_nothing() {
            let tmp = tempfile::tempdir().unwrap();
            let lame = script(
                tmp.path(),
                r#"for last; do :; done; printf partial > "$last"; echo "bad input" >&2; exit 1"#,
            );
            let src = tmp.path().join("mix.wav");
            let out = tmp.path().join("out");
            fs::write(&src, "pcm").unwrap();
            fs::create_dir(&out).unwrap();

            let err = LameEncoder::with_config(EncoderConfig::default().lame_path(&lame))
                .encode(&src, &out.join("mix.mp3"), 320)
                .unwrap_err();

            match err {
                TranscodeError::Failed {
                    exit_code, stderr, ..
                } => {
                    assert_eq!(exit_code, 1);
                    assert!(stderr.contains("bad input"));
                }
                other => panic!("expected Failed, got {other:?}"),
            }
            assert!(!out.join("mix.mp3").exists());
            assert!(leftovers(&out).is_empty());
        }
    }
}
