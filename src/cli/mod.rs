//! CLI command definitions and console helpers.
//!
//! Uses clap derive macros for argument definitions.

pub mod args;

use std::io::Write;
use std::path::Path;

use colored::Colorize;

/// Print the "what is being reviewed" header to stderr.
pub fn print_header(workspace: &Path, base_branch: &str, current_branch: Option<&str>) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(
        handle,
        "\n{} {}",
        "🔍 Reviewing code changes in:".blue().bold(),
        workspace.display()
    );
    let _ = writeln!(handle, "{}", format!("Base branch: {base_branch}").dimmed());
    if let Some(current) = current_branch {
        let _ = writeln!(handle, "{}", format!("Current branch: {current}").dimmed());
    }
    let _ = writeln!(handle, "{}", "Analyzing changes...".green().bold());
    let _ = handle.flush();
}
