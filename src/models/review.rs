//! Review result types, as returned by the analysis agent.
//!
//! These types double as the output schema the model is asked to follow,
//! so deserialization is strict: unknown severities and missing required
//! fields are rejected.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Severity level of a review comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSeverity {
    /// Informational suggestion.
    Info,
    /// Potential issue that should be addressed.
    Warning,
    /// Defect that must be fixed.
    Error,
    /// Severe defect or vulnerability.
    Critical,
}

/// Case-insensitive deserializer that rejects anything outside the four levels.
impl<'de> Deserialize<'de> for ReviewSeverity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ReviewSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewSeverity::Info => write!(f, "info"),
            ReviewSeverity::Warning => write!(f, "warning"),
            ReviewSeverity::Error => write!(f, "error"),
            ReviewSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for ReviewSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(ReviewSeverity::Info),
            "warning" => Ok(ReviewSeverity::Warning),
            "error" => Ok(ReviewSeverity::Error),
            "critical" => Ok(ReviewSeverity::Critical),
            _ => Err(format!(
                "unknown severity '{s}' (expected info, warning, error or critical)"
            )),
        }
    }
}

/// A single review comment on a code change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewComment {
    /// Path to the file, or `"N/A"` for comments about the review itself.
    pub file_path: String,
    /// 1-based line number in the new file.
    #[serde(default, deserialize_with = "positive_line")]
    #[schemars(with = "Option<u32>")]
    pub line_number: Option<u32>,
    /// Severity of the issue.
    pub severity: ReviewSeverity,
    /// Category of the comment (e.g. "security", "bug risk").
    pub category: String,
    /// The review comment itself.
    pub message: String,
    /// Suggested fix or improvement.
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Line numbers are 1-based; a `0` from the model means "no specific line".
fn positive_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let line = Option::<u32>::deserialize(deserializer)?;
    Ok(line.filter(|n| *n > 0))
}

/// Aggregate line counts across the reviewed changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TotalChanges {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Complete result of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CodeReview {
    /// Overall summary of the review.
    pub summary: String,
    /// Number of files sent for analysis.
    pub files_reviewed: usize,
    /// Total additions and deletions.
    pub total_changes: TotalChanges,
    /// Review comments, in the order the model returned them.
    #[serde(default)]
    pub comments: Vec<ReviewComment>,
    /// Positive aspects of the changes.
    #[serde(default)]
    pub positive_feedback: Vec<String>,
    /// Overall assessment (e.g. "approved", "needs work", "critical issues").
    pub overall_assessment: String,
    /// Provenance and diagnostic values attached after analysis.
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl CodeReview {
    /// Result for a review with nothing to look at.
    pub fn no_changes(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            files_reviewed: 0,
            total_changes: TotalChanges::default(),
            comments: Vec::new(),
            positive_feedback: vec!["No changes to review".to_string()],
            overall_assessment: "no changes".to_string(),
            metadata: IndexMap::new(),
        }
    }

    /// Comments carrying a suggestion, in their original order.
    pub fn suggestions(&self) -> impl Iterator<Item = &ReviewComment> {
        self.comments.iter().filter(|c| c.suggestion.is_some())
    }
}
