//! Doctor command implementation
//!
//! Checks the encoder, the active configuration, and whether the current
//! directory belongs to a project.

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use trackstamp_core::{find_project_root, ConfigSource, RootLookup, TOOL_VERSION};

use crate::context::Context;

/// Run the doctor command
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(ctx: &Context) -> Result<ExitCode> {
    println!("{}", "trackstamp doctor".cyan().bold());
    println!("{}", "=================".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!("  {} trackstamp v{}", "->".green(), TOOL_VERSION);
    println!();

    println!("{}", "Encoder:".bold());
    match ctx.encoder.locate() {
        Ok(path) => {
            let version = ctx.encoder.version().unwrap_or_else(|| "unknown".to_string());
            println!("  {} lame {} ({})", "ok".green(), version, path.display());
            println!(
                "  {} timeout {}s",
                "->".green(),
                ctx.config.encoder.timeout_secs
            );
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "lame is required for compressed savepoint bounces.".dimmed()
            );
            all_ok = false;
        }
    }
    println!();

    println!("{}", "Configuration:".bold());
    match &ctx.source {
        ConfigSource::Defaults => println!("  {} built-in defaults", "ok".green()),
        ConfigSource::File(path) => println!("  {} {}", "ok".green(), path.display()),
    }
    println!(
        "  {} marker '{}', {} categories, {} kbps",
        "->".green(),
        ctx.config.marker,
        ctx.config.taxonomy.len(),
        ctx.config.bitrate_kbps
    );
    println!();

    println!("{}", "Project:".bold());
    match env::current_dir() {
        Ok(dir) => match find_project_root(&dir, &ctx.config.marker) {
            RootLookup::Found(root) => println!("  {} {}", "ok".green(), root.display()),
            RootLookup::NotFound { .. } => println!(
                "  {} Not inside a project (pass --root to artifact commands)",
                "--".yellow()
            ),
        },
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}
