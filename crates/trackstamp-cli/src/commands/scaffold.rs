//! Scaffold command implementation
//!
//! Applies the project taxonomy to every directory under a base directory,
//! or to a single project.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Result};
use colored::Colorize;
use trackstamp_core::{is_project_candidate, Scaffolder};

use crate::context::Context;

/// Run the scaffold command
///
/// # Arguments
/// * `ctx` - Loaded configuration
/// * `base` - Directory whose immediate children are projects
/// * `project` - A single project directory, instead of `base`
///
/// # Returns
/// Exit code: 0 when every project was scaffolded, 1 when any failed or a
/// single `project` was skipped
pub fn run(ctx: &Context, base: Option<&Path>, project: Option<&Path>) -> Result<ExitCode> {
    let scaffolder = Scaffolder::new(&ctx.config);

    if let Some(project) = project {
        if !is_project_candidate(project) {
            println!(
                "{} {} skipped (not a project candidate: hidden or not a directory)",
                "--".yellow(),
                project.display()
            );
            return Ok(ExitCode::from(1));
        }
        let created = scaffolder.scaffold(project)?;
        if created {
            println!("{} {}", "new".green(), project.display());
        } else {
            println!("{} {}", "ok".green(), project.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(base) = base else {
        bail!("No base directory given; pass --base or set TRACKSTAMP_BASE");
    };

    let summary = scaffolder.scaffold_all(base)?;
    for path in &summary.newly_marked {
        println!("  {} {}", "new".green(), path.display());
    }
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            "!!".red(),
            failure.path.display(),
            failure.error
        );
    }

    match summary.new_count() {
        0 => println!("{}", "No new projects.".dimmed()),
        1 => println!("{} 1 new project", "Scaffolded".green().bold()),
        n => println!("{} {} new projects", "Scaffolded".green().bold(), n),
    }

    if summary.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} {} project(s) failed. See above for details.",
            "WARNING".yellow().bold(),
            summary.failures.len()
        );
        Ok(ExitCode::from(1))
    }
}
