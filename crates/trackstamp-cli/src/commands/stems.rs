//! stamp-stems and stamp-pt-stems command implementations

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use trackstamp_core::{SessionStemsRequest, StemsOutcome, StemsRequest};

use super::reporting::{print_heading, print_placement};
use crate::context::{current_dir, locator, Context};

/// Run the stamp-stems command (primary session tool, one time token).
pub fn run_primary(
    ctx: &Context,
    suffix: Option<String>,
    source: Option<PathBuf>,
    root: Option<PathBuf>,
) -> Result<ExitCode> {
    let request = StemsRequest {
        locator: locator(root, current_dir)?,
        suffix,
        source,
    };
    let outcome = ctx.engine().stamp_stems(&request)?;
    report(&outcome);
    Ok(ExitCode::SUCCESS)
}

/// Run the stamp-pt-stems command (secondary session tool, time span).
pub fn run_session(
    ctx: &Context,
    from: String,
    to: String,
    source: PathBuf,
    root: Option<PathBuf>,
) -> Result<ExitCode> {
    let request = SessionStemsRequest {
        locator: locator(root, current_dir)?,
        from,
        to,
        source,
    };
    let outcome = ctx.engine().stamp_session_stems(&request)?;
    report(&outcome);
    Ok(ExitCode::SUCCESS)
}

fn report(outcome: &StemsOutcome) {
    print_heading("Stems", outcome.project.slug());
    if outcome.stems.is_empty() {
        println!(
            "  {} No lossless stems in {}",
            "--".yellow(),
            outcome.source_dir.display()
        );
        return;
    }
    for stem in &outcome.stems {
        print_placement(&stem.part, &stem.placement);
    }
    println!("{} {} stem(s) moved", "Done".green().bold(), outcome.stems.len());
}
