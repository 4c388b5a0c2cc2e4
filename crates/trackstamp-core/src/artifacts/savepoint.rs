//! Savepoints: a timestamped save-state plus its rendered audio.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ArtifactEngine, Placement, PlacementAction, ProjectLocator};
use crate::error::{WorkflowError, WorkflowResult};
use crate::fsops::{ensure_dir, files_with_extension, newest};
use crate::naming::{ArtifactKind, ArtifactName, TimeToken};
use crate::project::Project;

/// Inputs for [`ArtifactEngine::create_savepoint`].
#[derive(Debug, Clone)]
pub struct SavepointRequest {
    pub locator: ProjectLocator,
    /// Save-state file; the newest one in the project is used when absent.
    pub save_state: Option<PathBuf>,
    /// Lossless render; the newest one in the scratch directory is used
    /// when absent.
    pub audio: Option<PathBuf>,
    /// Time token; the current time when absent.
    pub suffix: Option<String>,
}

/// Where a savepoint's files ended up.
#[derive(Debug, Clone)]
pub struct SavepointOutcome {
    pub project: Project,
    pub token: TimeToken,
    pub save_state: Placement,
    /// `None` when no lossless render was given or found.
    pub lossless: Option<Placement>,
    pub compressed: Option<Placement>,
}

impl ArtifactEngine<'_> {
    /// Captures a savepoint.
    ///
    /// The save-state is copied to `{slug}-{token}.{ext}` in the save-state
    /// directory. When a lossless render is available it is copied to the
    /// lossless bounce directory under the same stem, and the encoder
    /// produces the compressed derivative unless it already exists.
    pub fn create_savepoint(&self, request: &SavepointRequest) -> WorkflowResult<SavepointOutcome> {
        let token = match &request.suffix {
            Some(suffix) => TimeToken::parse(suffix)?,
            None => TimeToken::now(),
        };
        if let Some(path) = &request.save_state {
            require_file("Save-state file", path)?;
        }
        if let Some(path) = &request.audio {
            require_file("Audio file", path)?;
        }

        let project = self.open_project(&request.locator)?;
        let config = self.config;

        let save_state = match &request.save_state {
            Some(path) => path.clone(),
            None => self
                .newest_save_state(&project)?
                .ok_or_else(|| WorkflowError::source_not_found("Save-state file", project.root()))?,
        };
        let audio = match &request.audio {
            Some(path) => Some(path.clone()),
            None => newest(files_with_extension(
                &project.path(&config.layout.scratch),
                |ext| config.is_lossless(ext),
            )?)?,
        };

        let name = ArtifactName::new(project.slug(), ArtifactKind::Savepoint { token: &token });
        let save_state = self.place_copy(
            &save_state,
            &project.path(&config.layout.save_states),
            name,
        )?;

        let (lossless, compressed) = match audio {
            Some(audio) => {
                let lossless =
                    self.place_copy(&audio, &project.path(&config.layout.lossless), name)?;
                let compressed = self.encode_derivative(&project, &lossless.destination, name)?;
                (Some(lossless), Some(compressed))
            }
            None => {
                debug!(project = %project.slug(), "no lossless render for savepoint");
                (None, None)
            }
        };

        Ok(SavepointOutcome {
            project,
            token,
            save_state,
            lossless,
            compressed,
        })
    }

    fn newest_save_state(&self, project: &Project) -> WorkflowResult<Option<PathBuf>> {
        let config = self.config;
        let mut candidates = files_with_extension(project.root(), |ext| config.is_save_state(ext))?;
        candidates.extend(files_with_extension(
            &project.path(&config.marker),
            |ext| config.is_save_state(ext),
        )?);
        newest(candidates)
    }

    fn encode_derivative(
        &self,
        project: &Project,
        lossless: &Path,
        name: ArtifactName<'_>,
    ) -> WorkflowResult<Placement> {
        let dest_dir = project.path(&self.config.layout.compressed);
        let destination = dest_dir.join(name.file_name(&self.config.compressed_extension));

        if destination.exists() {
            return Ok(Placement {
                source: lossless.to_path_buf(),
                destination,
                action: PlacementAction::AlreadyPresent,
            });
        }

        ensure_dir(&dest_dir)?;
        self.encoder
            .encode(lossless, &destination, self.config.bitrate_kbps)?;
        debug!(encoder = self.encoder.name(), dst = %destination.display(), "encoded derivative");
        Ok(Placement {
            source: lossless.to_path_buf(),
            destination,
            action: PlacementAction::Encoded,
        })
    }
}

pub(super) fn require_file(what: &'static str, path: &Path) -> WorkflowResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(WorkflowError::source_not_found(what, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::test_support::{names, project, RecordingEncoder};
    use crate::config::WorkflowConfig;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn request(root: &Path, save_state: Option<PathBuf>, audio: Option<PathBuf>) -> SavepointRequest {
        SavepointRequest {
            locator: ProjectLocator::from_path(root),
            save_state,
            audio,
            suffix: Some("0115P".to_string()),
        }
    }

    #[test]
    fn test_savepoint_with_audio() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("MY_TRACK.als");
        let mix = tmp.path().join("mix.wav");
        fs::write(&set, b"set").unwrap();
        fs::write(&mix, b"pcm").unwrap();
        let encoder = RecordingEncoder::default();

        let outcome = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, Some(set.clone()), Some(mix)))
            .unwrap();

        assert_eq!(
            outcome.save_state.destination,
            root.join("ableton/sets/MY_TRACK-0115P.als")
        );
        let lossless = outcome.lossless.unwrap();
        assert_eq!(lossless.destination, root.join("bounces/wav/MY_TRACK-0115P.wav"));
        assert_eq!(fs::read(&lossless.destination).unwrap(), b"pcm");
        let compressed = outcome.compressed.unwrap();
        assert_eq!(compressed.destination, root.join("bounces/mp3/MY_TRACK-0115P.mp3"));
        assert_eq!(compressed.action, PlacementAction::Encoded);
        assert_eq!(
            encoder.calls.borrow().as_slice(),
            &[(lossless.destination.clone(), compressed.destination.clone(), 320)]
        );
        assert!(set.exists(), "savepoint copies, never moves");
    }

    #[test]
    fn test_savepoint_picks_newest_scratch_render() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("song.als");
        fs::write(&set, b"set").unwrap();
        let scratch = root.join("ableton/bounces");
        let old = scratch.join("old.wav");
        let new = scratch.join("new.aif");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();
        fs::write(scratch.join("ignored.mp3"), b"mp3").unwrap();
        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(600);
        fs::File::options().write(true).open(&old).unwrap().set_modified(past).unwrap();
        let encoder = RecordingEncoder::default();

        let outcome = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, Some(set), None))
            .unwrap();

        let lossless = outcome.lossless.unwrap();
        assert_eq!(lossless.source, new);
        assert_eq!(lossless.destination, root.join("bounces/wav/MY_TRACK-0115P.aif"));
    }

    #[test]
    fn test_savepoint_without_audio() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("song.als");
        fs::write(&set, b"set").unwrap();
        let encoder = RecordingEncoder::default();

        let outcome = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, Some(set), None))
            .unwrap();

        assert!(outcome.lossless.is_none());
        assert!(outcome.compressed.is_none());
        assert!(encoder.calls.borrow().is_empty());
        assert!(names(&root.join("bounces/wav")).is_empty());
    }

    #[test]
    fn test_savepoint_finds_save_state_when_omitted() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        fs::write(root.join("ableton/live_set.als"), b"set").unwrap();
        let encoder = RecordingEncoder::default();

        let outcome = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root.join("masters"), None, None))
            .unwrap();
        assert_eq!(outcome.save_state.source, root.join("ableton/live_set.als"));
    }

    #[test]
    fn test_savepoint_rerun_does_not_overwrite_or_reencode() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("song.als");
        let mix = root.join("ableton/bounces/mix.wav");
        fs::write(&set, b"v1").unwrap();
        fs::write(&mix, b"pcm").unwrap();
        let encoder = RecordingEncoder::default();
        let engine = ArtifactEngine::new(&config, &encoder);

        engine
            .create_savepoint(&request(&root, Some(set.clone()), Some(mix.clone())))
            .unwrap();
        fs::write(&set, b"v2").unwrap();
        let again = engine
            .create_savepoint(&request(&root, Some(set), Some(mix)))
            .unwrap();

        assert_eq!(again.save_state.action, PlacementAction::AlreadyPresent);
        assert_eq!(fs::read(&again.save_state.destination).unwrap(), b"v1");
        assert_eq!(again.compressed.unwrap().action, PlacementAction::AlreadyPresent);
        assert_eq!(encoder.calls.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_suffix_fails_before_io() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("song.als");
        fs::write(&set, b"set").unwrap();
        let encoder = RecordingEncoder::default();

        let mut req = request(&root, Some(set), None);
        req.suffix = Some("1:15pm".to_string());
        let err = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&req)
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidTimeToken { .. }));
        assert!(names(&root.join("ableton/sets")).is_empty());
    }

    #[test]
    fn test_missing_save_state_is_source_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let encoder = RecordingEncoder::default();

        let err = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, Some(root.join("gone.als")), None))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::SourceNotFound { .. }));

        let err = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, None, None))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::SourceNotFound { .. }));
    }

    #[test]
    fn test_encoder_failure_leaves_no_derivative() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::default();
        let root = project(tmp.path(), &config);
        let set = root.join("song.als");
        let mix = root.join("ableton/bounces/mix.wav");
        fs::write(&set, b"set").unwrap();
        fs::write(&mix, b"pcm").unwrap();
        let encoder = RecordingEncoder {
            fail: true,
            ..Default::default()
        };

        let err = ArtifactEngine::new(&config, &encoder)
            .create_savepoint(&request(&root, Some(set), Some(mix)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Transcode(_)));
        assert!(names(&root.join("bounces/mp3")).is_empty());
    }
}
