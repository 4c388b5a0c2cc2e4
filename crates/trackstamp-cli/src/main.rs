//! trackstamp CLI - timestamped artifacts for music production projects
//!
//! This binary scaffolds project directories and files savepoints, stems,
//! and masters under deterministic names.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use trackstamp_cli::commands;
use trackstamp_cli::commands::masters::Span;
use trackstamp_cli::commands::savepoint::SavepointArgs;
use trackstamp_cli::context::{current_dir, Context};
use trackstamp_cli::logging;

/// trackstamp - music project workflow
#[derive(Parser)]
#[command(name = "trackstamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Workflow config file (JSON); also read from TRACKSTAMP_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Time span and project root shared by the master commands.
#[derive(Args, Debug)]
struct SpanArgs {
    /// Start time token (HHMMA or HHMMP)
    #[arg(long)]
    from: String,

    /// End time token (HHMMA or HHMMP)
    #[arg(long)]
    to: String,

    /// Project root (default: search upward from the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
}

impl From<SpanArgs> for Span {
    fn from(args: SpanArgs) -> Self {
        Span {
            from: args.from,
            to: args.to,
            root: args.root,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project taxonomy, README, .gitignore and metadata
    Scaffold {
        /// Directory whose subdirectories are projects
        #[arg(long, env = "TRACKSTAMP_BASE")]
        base: Option<PathBuf>,

        /// Scaffold a single project directory instead
        #[arg(long, conflicts_with = "base")]
        project: Option<PathBuf>,
    },

    /// Copy a save-state and its bounce under a time token, encoding an MP3
    CreateSavepoint {
        /// Save-state file (default: newest in the project)
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Lossless bounce (default: newest in the scratch bounce directory)
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Time token to use instead of the current time
        #[arg(long)]
        suffix: Option<String>,

        /// Project root (default: search upward)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Tag and move exported stems from the primary session tool
    StampStems {
        /// Time token to use instead of the current time
        #[arg(long)]
        suffix: Option<String>,

        /// Directory holding the stems (default: the scratch bounce directory)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Project root (default: search upward from the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Tag and move exported stems from the secondary session tool
    StampPtStems {
        #[command(flatten)]
        span: SpanArgs,

        /// Directory holding the stems
        #[arg(long)]
        source: PathBuf,
    },

    /// Copy a print as the unmastered handoff
    MarkUnmastered {
        #[command(flatten)]
        span: SpanArgs,

        /// Lossless print
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Copy a mastered file as numbered master N
    CreateMaster {
        #[command(flatten)]
        span: SpanArgs,

        /// Mastered file
        #[arg(short, long)]
        input: PathBuf,

        /// Master number (1 or greater)
        #[arg(short, long)]
        number: u32,
    },

    /// Promote numbered master N to FINAL
    PromoteFinal {
        #[command(flatten)]
        span: SpanArgs,

        /// Number of the master to promote
        #[arg(short, long)]
        number: u32,

        /// Extension of the numbered master (default: first lossless match)
        #[arg(long)]
        ext: Option<String>,
    },

    /// Print the project root containing a path
    ResolveRoot {
        /// Path inside the project (default: current directory)
        path: Option<PathBuf>,
    },

    /// Check the encoder, configuration and current project
    Doctor,
}

fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scaffold { base, project } => {
            commands::scaffold::run(&ctx, base.as_deref(), project.as_deref())
        }
        Commands::CreateSavepoint {
            save_state,
            audio,
            suffix,
            root,
        } => commands::savepoint::run(
            &ctx,
            SavepointArgs {
                save_state,
                audio,
                suffix,
                root,
            },
        ),
        Commands::StampStems {
            suffix,
            source,
            root,
        } => commands::stems::run_primary(&ctx, suffix, source, root),
        Commands::StampPtStems { span, source } => {
            commands::stems::run_session(&ctx, span.from, span.to, source, span.root)
        }
        Commands::MarkUnmastered { span, input } => {
            commands::masters::run_unmastered(&ctx, span.into(), input)
        }
        Commands::CreateMaster {
            span,
            input,
            number,
        } => commands::masters::run_numbered(&ctx, span.into(), input, number),
        Commands::PromoteFinal { span, number, ext } => {
            commands::masters::run_final(&ctx, span.into(), number, ext)
        }
        Commands::ResolveRoot { path } => {
            let path = match path {
                Some(path) => path,
                None => current_dir()?,
            };
            commands::root::run(&ctx, &path)
        }
        Commands::Doctor => commands::doctor::run(&ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parses_savepoint() {
        let cli = Cli::try_parse_from([
            "trackstamp",
            "create-savepoint",
            "--save-state",
            "set.als",
            "--suffix",
            "0115P",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateSavepoint {
                save_state,
                audio,
                suffix,
                root,
            } => {
                assert_eq!(save_state, Some(PathBuf::from("set.als")));
                assert_eq!(audio, None);
                assert_eq!(suffix.as_deref(), Some("0115P"));
                assert_eq!(root, None);
            }
            _ => panic!("expected create-savepoint command"),
        }
    }

    #[test]
    fn test_cli_parses_promote_final() {
        let cli = Cli::try_parse_from([
            "trackstamp",
            "promote-final",
            "--from",
            "1200A",
            "--to",
            "1255A",
            "-n",
            "3",
            "--root",
            "/music/MY_TRACK",
        ])
        .unwrap();
        match cli.command {
            Commands::PromoteFinal { span, number, ext } => {
                assert_eq!(span.from, "1200A");
                assert_eq!(span.to, "1255A");
                assert_eq!(span.root, Some(PathBuf::from("/music/MY_TRACK")));
                assert_eq!(number, 3);
                assert_eq!(ext, None);
            }
            _ => panic!("expected promote-final command"),
        }
    }

    #[test]
    fn test_cli_stamp_pt_stems_requires_source() {
        let result = Cli::try_parse_from([
            "trackstamp",
            "stamp-pt-stems",
            "--from",
            "1200A",
            "--to",
            "1255A",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_scaffold_base_and_project_conflict() {
        let result = Cli::try_parse_from([
            "trackstamp",
            "scaffold",
            "--base",
            "/music",
            "--project",
            "/music/MY_TRACK",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["trackstamp", "doctor", "-v", "--config", "tracks.json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("tracks.json")));
        assert!(matches!(cli.command, Commands::Doctor));
    }

    #[test]
    fn test_cli_rejects_non_numeric_master() {
        let result = Cli::try_parse_from([
            "trackstamp",
            "create-master",
            "--from",
            "1200A",
            "--to",
            "1255A",
            "-i",
            "m.wav",
            "-n",
            "three",
        ]);
        assert!(result.is_err());
    }
}
