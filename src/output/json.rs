//! JSON output renderer.
//!
//! Emits the [`CodeReview`] itself, pretty-printed with snake_case keys.
//! This is the same shape the HTTP service returns.

use crate::models::CodeReview;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Pretty JSON for `review`, for callers that must not write a
    /// placeholder on failure (e.g. `--output`).
    pub fn to_json(&self, review: &CodeReview) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(review)
    }
}

impl OutputRenderer for JsonRenderer {
    fn render(&self, review: &CodeReview) -> String {
        self.to_json(review).unwrap_or_else(|e| {
            tracing::error!("failed to serialize review as JSON: {e}");
            "{}".to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewComment, ReviewSeverity};

    #[test]
    fn render_json() {
        let mut review = CodeReview::no_changes("Two files changed");
        review.files_reviewed = 2;
        review.overall_assessment = "needs work".into();
        review.comments.push(ReviewComment {
            file_path: "src/lib.rs".into(),
            line_number: Some(7),
            severity: ReviewSeverity::Critical,
            category: "security".into(),
            message: "SQL injection".into(),
            suggestion: Some("Use bind parameters".into()),
        });
        review
            .metadata
            .insert("base_branch".into(), serde_json::Value::from("main"));

        let output = JsonRenderer.render(&review);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["files_reviewed"], 2);
        assert_eq!(parsed["total_changes"]["additions"], 0);
        assert_eq!(parsed["comments"][0]["severity"], "critical");
        assert_eq!(parsed["comments"][0]["line_number"], 7);
        assert_eq!(parsed["overall_assessment"], "needs work");
        assert_eq!(parsed["metadata"]["base_branch"], "main");
    }

    #[test]
    fn to_json_matches_render() {
        let review = CodeReview::no_changes("Nothing");
        let json = JsonRenderer.to_json(&review).unwrap();
        assert_eq!(json, JsonRenderer.render(&review));
        assert!(json.contains("\"overall_assessment\": \"no changes\""));
    }

    #[test]
    fn output_parses_back() {
        let review = CodeReview::no_changes("No changes to review");
        let output = JsonRenderer.render(&review);
        let back: CodeReview = serde_json::from_str(&output).unwrap();
        assert_eq!(back, review);
    }
}
