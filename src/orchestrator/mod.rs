//! Review orchestrator: resolves the workspace, extracts changes, runs the
//! analysis agent and stamps provenance onto the result.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::agent::ReviewAgent;
use crate::config::Config;
use crate::diff::{DiffError, GitScanner};
use crate::models::{CodeReview, ReviewRequest};
use crate::providers::ReviewProvider;

/// Errors that make a review request unfulfillable.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The workspace is missing, not a repository, or bare.
    #[error("{0}")]
    Repository(DiffError),

    /// A branch or commit name did not resolve.
    #[error("{0}")]
    Revision(DiffError),

    /// Git itself failed in an unexpected way.
    #[error("{0}")]
    Git(DiffError),
}

impl From<DiffError> for ReviewError {
    fn from(err: DiffError) -> Self {
        if err.is_repository_error() {
            Self::Repository(err)
        } else if err.is_revision_error() {
            Self::Revision(err)
        } else {
            Self::Git(err)
        }
    }
}

impl ReviewError {
    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Revision(_))
    }
}

/// Entry point shared by the CLI and the HTTP service.
///
/// Holds only immutable state, so one instance can serve concurrent
/// requests; each call opens its own [`GitScanner`].
pub struct CoReviewer {
    config: Config,
    agent: ReviewAgent,
}

impl CoReviewer {
    pub fn new(provider: Arc<dyn ReviewProvider>, config: Config) -> Self {
        let agent = ReviewAgent::new(provider, &config);
        Self { config, agent }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Review one request from start to finish.
    ///
    /// Only repository and revision problems are returned as errors; a
    /// failed analysis still yields a [`CodeReview`].
    pub async fn review(&self, request: &ReviewRequest) -> Result<CodeReview, ReviewError> {
        let base_branch = request
            .base_branch
            .as_deref()
            .unwrap_or(&self.config.review.default_base_branch);

        let scanner = GitScanner::open(&request.workspace_path, &self.config.review).await?;

        let current_branch = match &request.current_branch {
            Some(branch) => branch.clone(),
            None => scanner.get_current_branch().await?,
        };

        tracing::info!(
            workspace = %request.workspace_path,
            base = base_branch,
            current = %current_branch,
            "starting review"
        );

        let changes = scanner
            .get_changes(base_branch, request.current_branch.as_deref())
            .await?;

        let mut review = if changes.is_empty() {
            tracing::info!("no changes detected");
            CodeReview::no_changes("No changes detected between branches")
        } else {
            self.agent
                .review_changes(
                    &changes,
                    request.custom_instructions.as_deref(),
                    &request.focus_areas,
                )
                .await
        };

        review
            .metadata
            .insert("base_branch".to_string(), Value::from(base_branch));
        review
            .metadata
            .insert("current_branch".to_string(), Value::from(current_branch));
        review.metadata.insert(
            "workspace_path".to_string(),
            Value::from(request.workspace_path.as_str()),
        );

        Ok(review)
    }
}
