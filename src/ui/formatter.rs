//! Pure formatting functions for UI output.
//!
//! Status lines follow the `<icon>  <label>  <message>` shape used by CI log
//! viewers; labels are padded so messages line up.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{Outcome, RunReport};

const LABEL_WIDTH: usize = 10;

fn status_line(icon: &str, label: &str, message: &str) -> String {
    format!("{}  {:<width$}{}", icon, label, message, width = LABEL_WIDTH)
}

/// Plain `✔  success   <message>` line
pub fn format_success(message: &str) -> String {
    status_line("✔", "success", message)
}

/// Plain `✖  fatal     <message>` line
pub fn format_fatal(message: &str) -> String {
    status_line("✖", "fatal", message)
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{}", style(format_success(message)).green());
}

/// Format and print a fatal error in red.
pub fn display_fatal(message: &str) {
    eprintln!("{}", style(format_fatal(message)).red().bold());
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the outcome of a run: warnings first, then the summary line.
pub fn display_report(report: &RunReport) {
    for warning in &report.warnings {
        display_boundary_warning(warning);
    }

    match &report.outcome {
        Outcome::Bumped(result) => {
            display_status(&format!(
                "{} {} on '{}'",
                if result.tagged { "Tagged" } else { "Bumped to" },
                result.tag,
                result.branch
            ));
        }
        Outcome::DryRun { .. } => display_status("No files or refs were changed"),
        Outcome::Skipped(_) | Outcome::PushDisabled { .. } => {}
    }

    display_success(&report.message());
}
