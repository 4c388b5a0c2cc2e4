use colored::{ColoredString, Colorize};
use trackstamp_core::{Placement, PlacementAction};

/// Status glyph for an action, styled like the doctor output.
fn glyph(action: PlacementAction) -> ColoredString {
    match action {
        PlacementAction::AlreadyPresent => "--".yellow(),
        _ => "ok".green(),
    }
}

/// Prints one placement as `  ok <label> <destination> (<action>)`.
pub(crate) fn print_placement(label: &str, placement: &Placement) {
    println!(
        "  {} {:<11} {} {}",
        glyph(placement.action),
        label,
        placement.destination.display(),
        format!("({})", placement.action.as_str()).dimmed()
    );
}

/// Prints the heading shared by every artifact command.
pub(crate) fn print_heading(what: &str, detail: &str) {
    println!("{} {}", what.cyan().bold(), detail.bold());
}
