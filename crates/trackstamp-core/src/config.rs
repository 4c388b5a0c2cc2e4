//! Workflow configuration.
//!
//! Every process-wide constant (taxonomy, layout roles, part vocabulary,
//! ignore list, extensions) lives in [`WorkflowConfig`]. It is loaded once at
//! startup and passed by reference into the scaffolder and artifact engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{WorkflowError, WorkflowResult};
use crate::transcode::{DEFAULT_BITRATE_KBPS, DEFAULT_ENCODE_TIMEOUT_SECS};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "TRACKSTAMP_CONFIG";

/// A top-level category and its ordered subdirectories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub subdirs: Vec<String>,
}

impl Category {
    pub fn new(name: &str, subdirs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subdirs: subdirs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Where each artifact role lives, as `/`-separated paths relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Timestamped save-state copies.
    pub save_states: String,
    /// Scratch directory the host application exports into.
    pub scratch: String,
    /// Timestamped lossless bounces.
    pub lossless: String,
    /// Compressed derivatives of the lossless bounces.
    pub compressed: String,
    /// Stems exported from the primary session tool.
    pub stems_primary: String,
    /// Stems exported from the secondary session tool.
    pub stems_secondary: String,
    /// Unmastered prints, numbered masters, FINAL masters.
    pub masters: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            save_states: "ableton/sets".to_string(),
            scratch: "ableton/bounces".to_string(),
            lossless: "bounces/wav".to_string(),
            compressed: "bounces/mp3".to_string(),
            stems_primary: "stems_ableton".to_string(),
            stems_secondary: "stems_protools".to_string(),
            masters: "masters".to_string(),
        }
    }
}

impl Layout {
    /// Returns `(role, relative path)` for every role.
    pub fn roles(&self) -> [(&'static str, &str); 7] {
        [
            ("save_states", self.save_states.as_str()),
            ("scratch", self.scratch.as_str()),
            ("lossless", self.lossless.as_str()),
            ("compressed", self.compressed.as_str()),
            ("stems_primary", self.stems_primary.as_str()),
            ("stems_secondary", self.stems_secondary.as_str()),
            ("masters", self.masters.as_str()),
        ]
    }
}

/// Keywords recognised in stem filenames and the tag each maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartVocabulary {
    /// Lowercase keyword → uppercase part tag.
    pub keywords: BTreeMap<String, String>,
    /// Tag used when no keyword matches.
    pub default_tag: String,
}

impl Default for PartVocabulary {
    fn default() -> Self {
        let pairs = [
            ("vocals", "VOCALS"),
            ("vocal", "VOCALS"),
            ("vox", "VOCALS"),
            ("bvs", "BVS"),
            ("drums", "DRUMS"),
            ("drum", "DRUMS"),
            ("kick", "KICK"),
            ("snare", "SNARE"),
            ("hats", "HATS"),
            ("perc", "PERC"),
            ("bass", "BASS"),
            ("synth", "SYNTH"),
            ("keys", "KEYS"),
            ("piano", "PIANO"),
            ("guitar", "GUITAR"),
            ("gtr", "GUITAR"),
            ("pads", "PADS"),
            ("pad", "PADS"),
            ("lead", "LEAD"),
            ("strings", "STRINGS"),
            ("brass", "BRASS"),
            ("fx", "FX"),
        ];
        Self {
            keywords: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            default_tag: "STEM".to_string(),
        }
    }
}

impl PartVocabulary {
    /// Detects the part tag for a file stem.
    ///
    /// The stem is split on `_`, `-`, `.` and whitespace and each token is
    /// lowercased. Every matching token replaces the previous match, so the
    /// last keyword in the filename wins.
    pub fn detect<'a>(&'a self, file_stem: &str) -> &'a str {
        let mut found: Option<&'a str> = None;
        for token in file_stem
            .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if let Some(tag) = self.keywords.get(&token.to_lowercase()) {
                found = Some(tag.as_str());
            }
        }
        found.unwrap_or(&self.default_tag)
    }
}

/// Names of the small files written into every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFiles {
    pub readme: String,
    pub gitignore: String,
    pub metadata: String,
    pub marker: String,
}

impl Default for ProjectFiles {
    fn default() -> Self {
        Self {
            readme: "README.md".to_string(),
            gitignore: ".gitignore".to_string(),
            metadata: "project.json".to_string(),
            marker: ".trackstamp".to_string(),
        }
    }
}

/// How the external encoder is found and run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Encoder executable. When unset or missing, the environment and `PATH`
    /// are searched.
    pub path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
        }
    }
}

/// Complete workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Top-level directory whose presence identifies a project root.
    pub marker: String,
    /// Ordered category → subdirectory map.
    pub taxonomy: Vec<Category>,
    pub layout: Layout,
    pub parts: PartVocabulary,
    /// Lines every project's `.gitignore` must contain.
    pub gitignore: Vec<String>,
    /// Extensions treated as lossless audio (lowercase, no dot).
    pub lossless_extensions: Vec<String>,
    /// Extensions treated as host save-state files (lowercase, no dot).
    pub save_state_extensions: Vec<String>,
    /// Extension of compressed derivatives (no dot).
    pub compressed_extension: String,
    /// Constant bitrate handed to the encoder.
    pub bitrate_kbps: u32,
    pub encoder: EncoderSettings,
    pub files: ProjectFiles,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            marker: "ableton".to_string(),
            taxonomy: vec![
                Category::new("ableton", &["sets", "bounces", "samples"]),
                Category::new("bounces", &["wav", "mp3"]),
                Category::new("stems_ableton", &[]),
                Category::new("stems_protools", &[]),
                Category::new("masters", &[]),
                Category::new("protools", &["audio", "bounces", "sessions"]),
                Category::new("recordings", &["vocals", "instruments", "takes"]),
                Category::new("notes", &[]),
            ],
            layout: Layout::default(),
            parts: PartVocabulary::default(),
            gitignore: [
                ".DS_Store",
                "*.asd",
                "Backup/",
                "Ableton Project Info/",
                "protools/audio/",
                "*.wav",
                "*.aif",
                "*.aiff",
                "*.mp3",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            lossless_extensions: vec!["wav".to_string(), "aif".to_string(), "aiff".to_string()],
            save_state_extensions: vec!["als".to_string()],
            compressed_extension: "mp3".to_string(),
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            encoder: EncoderSettings::default(),
            files: ProjectFiles::default(),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

impl WorkflowConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> WorkflowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WorkflowError::io(path, e))?;
        let config: WorkflowConfig = serde_json::from_str(&content).map_err(|e| {
            WorkflowError::config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from `explicit`, else `$TRACKSTAMP_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> WorkflowResult<(Self, ConfigSource)> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => {
                let config = Self::from_json_file(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Checks that the marker and every layout role point into the taxonomy.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.category(&self.marker).is_none() {
            return Err(WorkflowError::config(format!(
                "marker '{}' is not a taxonomy category",
                self.marker
            )));
        }

        for (role, rel) in self.layout.roles() {
            let mut parts = rel.split('/').filter(|p| !p.is_empty());
            let Some(category) = parts.next().and_then(|name| self.category(name)) else {
                return Err(WorkflowError::config(format!(
                    "layout.{} = '{}' does not start with a taxonomy category",
                    role, rel
                )));
            };
            if let Some(sub) = parts.next() {
                if !category.subdirs.iter().any(|s| s == sub) {
                    return Err(WorkflowError::config(format!(
                        "layout.{} = '{}': '{}' is not a subdirectory of '{}'",
                        role, rel, sub, category.name
                    )));
                }
            }
        }

        if self.bitrate_kbps == 0 {
            return Err(WorkflowError::config("bitrate_kbps must be positive"));
        }
        if self.encoder.timeout_secs == 0 {
            return Err(WorkflowError::config("encoder.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Looks up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.taxonomy.iter().find(|c| c.name == name)
    }

    /// Every directory of the taxonomy as relative paths, categories first,
    /// each followed by its subdirectories.
    pub fn taxonomy_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for category in &self.taxonomy {
            let base = PathBuf::from(&category.name);
            let subdirs: Vec<PathBuf> = category.subdirs.iter().map(|s| base.join(s)).collect();
            dirs.push(base);
            dirs.extend(subdirs);
        }
        dirs
    }

    /// True when `ext` (any case, no dot) is a lossless extension.
    pub fn is_lossless(&self, ext: &str) -> bool {
        has_extension(&self.lossless_extensions, ext)
    }

    /// True when `ext` (any case, no dot) is a save-state extension.
    pub fn is_save_state(&self, ext: &str) -> bool {
        has_extension(&self.save_state_extensions, ext)
    }
}

fn has_extension(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}
