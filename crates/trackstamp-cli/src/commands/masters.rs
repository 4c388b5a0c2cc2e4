//! mark-unmastered, create-master and promote-final command implementations

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use trackstamp_core::{FinalMasterRequest, NumberedMasterRequest, Placement, UnmasteredRequest};

use super::reporting::{print_heading, print_placement};
use crate::context::{current_dir, locator, Context};

/// Time span and project shared by the master commands.
#[derive(Debug, Clone)]
pub struct Span {
    pub from: String,
    pub to: String,
    pub root: Option<PathBuf>,
}

/// Run the mark-unmastered command
pub fn run_unmastered(ctx: &Context, span: Span, input: PathBuf) -> Result<ExitCode> {
    let request = UnmasteredRequest {
        locator: locator(span.root, current_dir)?,
        from: span.from,
        to: span.to,
        source: input,
    };
    let placement = ctx.engine().mark_unmastered(&request)?;
    report("Unmastered", "print", &placement);
    Ok(ExitCode::SUCCESS)
}

/// Run the create-master command
pub fn run_numbered(ctx: &Context, span: Span, input: PathBuf, number: u32) -> Result<ExitCode> {
    let request = NumberedMasterRequest {
        locator: locator(span.root, current_dir)?,
        from: span.from,
        to: span.to,
        source: input,
        version: number,
    };
    let placement = ctx.engine().create_numbered_master(&request)?;
    report("Master", &format!("#{}", number), &placement);
    Ok(ExitCode::SUCCESS)
}

/// Run the promote-final command
pub fn run_final(
    ctx: &Context,
    span: Span,
    number: u32,
    extension: Option<String>,
) -> Result<ExitCode> {
    let request = FinalMasterRequest {
        locator: locator(span.root, current_dir)?,
        from: span.from,
        to: span.to,
        version: number,
        extension,
    };
    let placement = ctx.engine().promote_final_master(&request)?;
    report("Final", &format!("from #{}", number), &placement);
    Ok(ExitCode::SUCCESS)
}

fn report(heading: &str, label: &str, placement: &Placement) {
    let name = placement
        .destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    print_heading(heading, &name);
    print_placement(label, placement);
}
