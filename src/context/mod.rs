//! Review context assembly.
//!
//! Turns a list of [`FileChange`]s into the plain-text blocks and summary
//! values that the analysis prompt is built from.

use crate::models::{FileChange, FileChangeType, change};

/// Label used when no focus areas are requested.
pub const GENERAL_FOCUS: &str = "General code quality";

/// Placeholder used when no custom instructions are given.
pub const NO_INSTRUCTIONS: &str = "None";

/// Everything the prompt needs to know about a set of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewContext {
    pub num_files: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    /// One text block per file, separated by blank lines.
    pub changes: String,
    pub focus_areas: String,
    pub custom_instructions: String,
}

/// Keep at most `max_files` changes, in their original order.
pub fn cap_changes(changes: &[FileChange], max_files: usize) -> &[FileChange] {
    if changes.len() > max_files {
        tracing::warn!(
            "too many files changed ({}), reviewing only the first {max_files}",
            changes.len()
        );
        &changes[..max_files]
    } else {
        changes
    }
}

/// Build the review context for an already capped set of changes.
pub fn assemble(
    changes: &[FileChange],
    custom_instructions: Option<&str>,
    focus_areas: &[String],
) -> ReviewContext {
    let (total_additions, total_deletions) = change::totals(changes);

    let blocks: Vec<String> = changes.iter().map(format_change).collect();

    let focus_areas = if focus_areas.is_empty() {
        GENERAL_FOCUS.to_string()
    } else {
        focus_areas.join(", ")
    };

    ReviewContext {
        num_files: changes.len(),
        total_additions,
        total_deletions,
        changes: blocks.join("\n\n"),
        focus_areas,
        custom_instructions: custom_instructions
            .unwrap_or(NO_INSTRUCTIONS)
            .to_string(),
    }
}

fn format_change(change: &FileChange) -> String {
    let old_path = match (&change.change_type, &change.old_path) {
        (FileChangeType::Renamed, Some(old)) => format!("Old Path: {old}"),
        _ => String::new(),
    };
    let block = format!(
        "File: {}\nChange Type: {}\nAdditions: +{}, Deletions: -{}\n{}\n\nDiff:\n{}\n---",
        change.file_path, change.change_type, change.additions, change.deletions, old_path, change.diff,
    );
    block.trim().to_string()
}
