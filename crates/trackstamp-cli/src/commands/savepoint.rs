//! create-savepoint command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use trackstamp_core::SavepointRequest;

use super::reporting::{print_heading, print_placement};
use crate::context::{current_dir, locator, Context};

/// Arguments of `create-savepoint`.
#[derive(Debug, Clone, Default)]
pub struct SavepointArgs {
    pub save_state: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub suffix: Option<String>,
    pub root: Option<PathBuf>,
}

/// Run the create-savepoint command
///
/// The project is searched upward from the save-state file when one is
/// given, else from the current directory.
pub fn run(ctx: &Context, args: SavepointArgs) -> Result<ExitCode> {
    let start = args.save_state.clone();
    let request = SavepointRequest {
        locator: locator(args.root, || match start {
            Some(path) => Ok(path),
            None => current_dir(),
        })?,
        save_state: args.save_state,
        audio: args.audio,
        suffix: args.suffix,
    };

    let outcome = ctx.engine().create_savepoint(&request)?;

    print_heading(
        "Savepoint",
        &format!("{}-{}", outcome.project.slug(), outcome.token),
    );
    print_placement("save-state", &outcome.save_state);
    match (&outcome.lossless, &outcome.compressed) {
        (Some(lossless), Some(compressed)) => {
            print_placement("lossless", lossless);
            print_placement("compressed", compressed);
        }
        _ => println!(
            "  {} {}",
            "--".yellow(),
            "No lossless audio found; saved the save-state only.".dimmed()
        ),
    }
    Ok(ExitCode::SUCCESS)
}
