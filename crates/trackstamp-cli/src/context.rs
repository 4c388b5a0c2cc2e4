//! Configuration and encoder shared by every command.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use trackstamp_core::{ArtifactEngine, ConfigSource, ProjectLocator, WorkflowConfig};
use trackstamp_encoder::{EncoderConfig, LameEncoder};

/// Loaded once per invocation and passed to the command that runs.
#[derive(Debug)]
pub struct Context {
    pub config: WorkflowConfig,
    pub source: ConfigSource,
    pub encoder: LameEncoder,
}

impl Context {
    /// Loads the config from `config_path`, `$TRACKSTAMP_CONFIG`, or defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config, source) =
            WorkflowConfig::load(config_path).context("Failed to load configuration")?;
        Ok(Self::from_parts(config, source))
    }

    /// Context around an already-built configuration.
    pub fn with_config(config: WorkflowConfig) -> Self {
        Self::from_parts(config, ConfigSource::Defaults)
    }

    fn from_parts(config: WorkflowConfig, source: ConfigSource) -> Self {
        let encoder = LameEncoder::with_config(EncoderConfig::from(&config.encoder));
        Self {
            config,
            source,
            encoder,
        }
    }

    pub fn engine(&self) -> ArtifactEngine<'_> {
        ArtifactEngine::new(&self.config, &self.encoder)
    }
}

/// Builds a locator from an optional `--root` and a search start.
pub fn locator(root: Option<PathBuf>, start: impl FnOnce() -> Result<PathBuf>) -> Result<ProjectLocator> {
    match root {
        Some(root) => Ok(ProjectLocator::with_root(root)),
        None => Ok(ProjectLocator::from_path(start()?)),
    }
}

/// The current directory, as an anyhow error when unavailable.
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Cannot determine current directory")
}
