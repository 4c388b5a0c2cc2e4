//! trackstamp core library
//!
//! This crate holds everything the `trackstamp` commands need to keep a
//! music-production project tidy:
//!
//! - **Taxonomy and configuration**: the fixed category → subdirectory layout
//!   every project carries, plus the part vocabulary and ignore list
//! - **Naming**: project slugs and titles, the `HHMMA|P` time token, and the
//!   deterministic artifact filename templates
//! - **Root resolution**: walking upward from any path to the project root
//! - **Scaffolding**: idempotent, additive creation of the taxonomy, README,
//!   `.gitignore`, and metadata record
//! - **Artifacts**: the savepoint → stems → unmastered → master → final
//!   lifecycle operations
//!
//! # Example
//!
//! ```
//! use trackstamp_core::naming::{ArtifactKind, ArtifactName, TimeToken};
//!
//! let token = TimeToken::parse("0115P").unwrap();
//! let name = ArtifactName::new("MY_TRACK", ArtifactKind::Savepoint { token: &token });
//! assert_eq!(name.file_name("als"), "MY_TRACK-0115P.als");
//! ```
//!
//! # Modules
//!
//! - [`config`]: Workflow configuration (taxonomy, layout roles, vocabulary)
//! - [`error`]: Error type shared by every operation
//! - [`naming`]: Slugs, titles, time tokens, filename templates
//! - [`root`]: Project root discovery
//! - [`scaffold`]: Project scaffolding and batch driver
//! - [`metadata`]: The per-project metadata record
//! - [`artifacts`]: Artifact lifecycle operations
//! - [`transcode`]: Encoder interface used for compressed derivatives

pub mod artifacts;
pub mod config;
pub mod error;
pub mod fsops;
pub mod metadata;
pub mod naming;
pub mod project;
pub mod root;
pub mod scaffold;
pub mod transcode;

pub use artifacts::{
    ArtifactEngine, FinalMasterRequest, NumberedMasterRequest, Placement, PlacementAction,
    ProjectLocator, SavepointOutcome, SavepointRequest, SessionStemsRequest, StemPlacement,
    StemsOutcome, StemsRequest, UnmasteredRequest,
};
pub use config::{
    Category, ConfigSource, EncoderSettings, Layout, PartVocabulary, ProjectFiles, WorkflowConfig,
};
pub use error::{WorkflowError, WorkflowResult};
pub use metadata::{ProjectMetadata, TOOL_VERSION};
pub use naming::{
    format_now_suffix, slug_from_name, title_from_name, validate_suffix, ArtifactKind,
    ArtifactName, TimeToken,
};
pub use project::Project;
pub use root::{find_project_root, normalize_path, resolve_project_root, RootLookup};
pub use scaffold::{is_project_candidate, ProjectFailure, ScaffoldSummary, Scaffolder};
pub use transcode::{Encoder, TranscodeError, DEFAULT_BITRATE_KBPS, DEFAULT_ENCODE_TIMEOUT_SECS};
