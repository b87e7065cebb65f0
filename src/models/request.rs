//! Review request, the input contract shared by the CLI and the HTTP service.

use serde::{Deserialize, Serialize};

/// A request to review the changes between two revisions of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Path to the git workspace.
    pub workspace_path: String,
    /// Base branch to compare against. Falls back to the configured
    /// default (`main` unless overridden).
    #[serde(default)]
    pub base_branch: Option<String>,
    /// Current branch or commit (defaults to HEAD).
    #[serde(default)]
    pub current_branch: Option<String>,
    /// Free-text instructions for the reviewer.
    #[serde(default)]
    pub custom_instructions: Option<String>,
    /// Specific areas to focus on (e.g. "security", "performance").
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

impl ReviewRequest {
    /// Request reviewing HEAD of `workspace_path` against the default base.
    pub fn new(workspace_path: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            base_branch: None,
            current_branch: None,
            custom_instructions: None,
            focus_areas: Vec::new(),
        }
    }
}
