//! Terminal renderer: summary panel, comment table, suggestions and
//! positive feedback.

use colored::{ColoredString, Colorize};

use crate::models::{CodeReview, NOT_APPLICABLE, ReviewComment, ReviewSeverity};
use crate::output::OutputRenderer;

/// Widest a table column other than the message may grow.
const MAX_COLUMN_WIDTH: usize = 40;

/// Terminal output renderer with colored text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, review: &CodeReview) -> String {
        let mut output = render_summary(review);

        if !review.comments.is_empty() {
            output.push_str(&format!("\n{}\n\n", "📝 Review Comments:".bold()));
            output.push_str(&render_table(&review.comments));

            let suggestions: Vec<&ReviewComment> = review.suggestions().collect();
            if !suggestions.is_empty() {
                output.push_str(&format!("\n{}\n\n", "💡 Suggestions:".bold()));
                for (i, comment) in suggestions.iter().enumerate() {
                    output.push_str(&format!(
                        "{}. {} (Line {})\n   {}\n\n",
                        i + 1,
                        comment.file_path.cyan(),
                        line_label(comment),
                        comment.suggestion.as_deref().unwrap_or_default()
                    ));
                }
            }
        }

        if !review.positive_feedback.is_empty() {
            output.push_str(&format!("\n{}\n\n", "✓ Positive Feedback:".green().bold()));
            for feedback in &review.positive_feedback {
                output.push_str(&format!("  • {feedback}\n"));
            }
        }

        output
    }
}

fn render_summary(review: &CodeReview) -> String {
    let title = " 📋 Review Summary ";
    let rule = "─".repeat(60);
    let mut out = String::new();
    out.push_str(&format!("{}{}\n", "──".blue(), title.bold()));
    out.push_str(&format!("{}\n\n", review.summary.bold()));
    out.push_str(&format!("Files Reviewed: {}\n", review.files_reviewed));
    out.push_str(&format!(
        "Total Changes: {} {}\n",
        format!("+{}", review.total_changes.additions).green(),
        format!("-{}", review.total_changes.deletions).red()
    ));
    out.push_str(&format!(
        "Assessment: {}\n",
        review.overall_assessment.to_uppercase().bold()
    ));
    out.push_str(&format!("{}\n", rule.blue()));
    out
}

fn render_table(comments: &[ReviewComment]) -> String {
    let rows: Vec<[String; 4]> = comments
        .iter()
        .map(|c| {
            [
                c.file_path.clone(),
                line_label(c),
                c.severity.to_string().to_uppercase(),
                c.category.clone(),
            ]
        })
        .collect();

    let headers = ["File", "Line", "Severity", "Category"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count()).min(MAX_COLUMN_WIDTH);
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}  {}  {}  {}\n",
        pad(headers[0], widths[0]).magenta().bold(),
        pad_left(headers[1], widths[1]).magenta().bold(),
        pad(headers[2], widths[2]).magenta().bold(),
        pad(headers[3], widths[3]).magenta().bold(),
        "Message".magenta().bold(),
    ));

    for (comment, row) in comments.iter().zip(&rows) {
        out.push_str(&format!(
            "{}  {}  {}  {}  {}\n",
            pad(&row[0], widths[0]).cyan(),
            pad_left(&row[1], widths[1]).yellow(),
            severity_colored(comment.severity, &pad(&row[2], widths[2])),
            pad(&row[3], widths[3]).blue(),
            comment.message,
        ));
    }
    out
}

fn line_label(comment: &ReviewComment) -> String {
    comment
        .line_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

fn severity_colored(severity: ReviewSeverity, text: &str) -> ColoredString {
    match severity {
        ReviewSeverity::Info => text.blue(),
        ReviewSeverity::Warning => text.yellow(),
        ReviewSeverity::Error => text.red(),
        ReviewSeverity::Critical => text.red().bold(),
    }
}

/// Left-align `text` in `width` columns, cutting it with `…` if needed.
fn pad(text: &str, width: usize) -> String {
    let fitted = fit(text, width);
    format!("{fitted:<width$}")
}

fn pad_left(text: &str, width: usize) -> String {
    let fitted = fit(text, width);
    format!("{fitted:>width$}")
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
