//! Analysis agent: sends assembled changes to the model and turns the
//! answer into a [`CodeReview`].
//!
//! [`ReviewAgent::review_changes`] never fails. Backend errors, timeouts
//! and malformed responses all come back as an `"error"` review.

pub mod prompt;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

use crate::config::{Config, ReviewConfig};
use crate::context::{self, ReviewContext};
use crate::models::{
    CodeReview, FileChange, NOT_APPLICABLE, ReviewComment, ReviewSeverity, TotalChanges,
};
use crate::providers::{ProviderError, ReviewProvider};

/// Turns file changes into a review using one model call.
pub struct ReviewAgent {
    provider: Arc<dyn ReviewProvider>,
    settings: ReviewConfig,
    timeout: Duration,
}

impl ReviewAgent {
    pub fn new(provider: Arc<dyn ReviewProvider>, config: &Config) -> Self {
        Self {
            provider,
            settings: config.review.clone(),
            timeout: config.provider.timeout(),
        }
    }

    /// Review `changes`, capped to the configured number of files.
    pub async fn review_changes(
        &self,
        changes: &[FileChange],
        custom_instructions: Option<&str>,
        focus_areas: &[String],
    ) -> CodeReview {
        if changes.is_empty() {
            return CodeReview::no_changes("No changes to review");
        }

        let changes = context::cap_changes(changes, self.settings.max_files_per_review);
        let ctx = context::assemble(changes, custom_instructions, focus_areas);
        let totals = TotalChanges {
            additions: ctx.total_additions,
            deletions: ctx.total_deletions,
        };

        tracing::info!(
            files = ctx.num_files,
            additions = totals.additions,
            deletions = totals.deletions,
            "requesting review"
        );

        match self.run_review(&ctx).await {
            Ok(mut review) => {
                review.files_reviewed = ctx.num_files;
                review.total_changes = totals;
                tracing::info!(
                    comments = review.comments.len(),
                    assessment = %review.overall_assessment,
                    "review complete"
                );
                review
            }
            Err(e) => {
                tracing::error!("review failed: {e}");
                error_review(ctx.num_files, totals, &e.to_string())
            }
        }
    }

    async fn run_review(&self, ctx: &ReviewContext) -> Result<CodeReview, ProviderError> {
        let user_prompt = prompt::build_user_prompt(ctx);
        let response = tokio::time::timeout(
            self.timeout,
            self.provider.complete(prompt::SYSTEM_PROMPT, &user_prompt),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout.as_secs()))??;

        tracing::debug!(len = response.len(), "received model response");
        response::parse_review(&response)
    }
}

/// Result reported when analysis failed.
fn error_review(files_reviewed: usize, total_changes: TotalChanges, error: &str) -> CodeReview {
    let mut metadata = IndexMap::new();
    metadata.insert("error".to_string(), serde_json::Value::from(error));

    CodeReview {
        summary: format!("Review failed with error: {error}"),
        files_reviewed,
        total_changes,
        comments: vec![ReviewComment {
            file_path: NOT_APPLICABLE.to_string(),
            line_number: None,
            severity: ReviewSeverity::Error,
            category: "system".to_string(),
            message: format!("Review process failed: {error}"),
            suggestion: None,
        }],
        positive_feedback: Vec::new(),
        overall_assessment: "error".to_string(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileChangeType;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        delay: Option<Duration>,
    }

    impl MockProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                delay: None,
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                delay: None,
            })
        }
    }

    #[async_trait]
    impl ReviewProvider for MockProvider {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(user.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone().map_err(ProviderError::ApiError)
        }
    }

    const REPLY: &str = r#"{
        "summary": "Looks fine",
        "files_reviewed": 99,
        "total_changes": {"additions": 999, "deletions": 999},
        "comments": [{"file_path": "a.rs", "line_number": 3, "severity": "info", "category": "style", "message": "nit"}],
        "positive_feedback": ["Good tests"],
        "overall_assessment": "approved"
    }"#;

    fn changes(n: usize) -> Vec<FileChange> {
        (0..n)
            .map(|i| {
                FileChange::new(
                    format!("file{i}.rs"),
                    FileChangeType::Modified,
                    2,
                    1,
                    "@@ -1 +1,2 @@\n-a\n+b\n+c",
                )
            })
            .collect()
    }

    fn agent(provider: Arc<MockProvider>, max_files: usize) -> ReviewAgent {
        let mut config = Config::default();
        config.review.max_files_per_review = max_files;
        ReviewAgent::new(provider, &config)
    }

    #[tokio::test]
    async fn empty_changes_skip_the_backend() {
        let provider = MockProvider::replying(REPLY);
        let review = agent(provider.clone(), 20).review_changes(&[], None, &[]).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(review.files_reviewed, 0);
        assert_eq!(review.total_changes, TotalChanges::default());
        assert!(review.comments.is_empty());
        assert_eq!(review.positive_feedback, vec!["No changes to review"]);
        assert_eq!(review.overall_assessment, "no changes");
    }

    #[tokio::test]
    async fn successful_review_uses_computed_counts() {
        let provider = MockProvider::replying(REPLY);
        let review = agent(provider.clone(), 20)
            .review_changes(&changes(3), None, &[])
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(review.summary, "Looks fine");
        assert_eq!(review.files_reviewed, 3);
        assert_eq!(review.total_changes, TotalChanges { additions: 6, deletions: 3 });
        assert_eq!(review.comments.len(), 1);
        assert_eq!(review.overall_assessment, "approved");
    }

    #[tokio::test]
    async fn file_cap_applies_once_in_order() {
        let provider = MockProvider::replying(REPLY);
        let review = agent(provider.clone(), 2)
            .review_changes(&changes(5), None, &[])
            .await;

        assert_eq!(review.files_reviewed, 2);
        assert_eq!(review.total_changes, TotalChanges { additions: 4, deletions: 2 });
        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Number of Files: 2"));
        assert!(prompt.contains("File: file0.rs"));
        assert!(prompt.contains("File: file1.rs"));
        assert!(!prompt.contains("File: file2.rs"));
    }

    #[tokio::test]
    async fn instructions_and_focus_reach_the_prompt() {
        let provider = MockProvider::replying(REPLY);
        let focus = vec!["security".to_string(), "performance".to_string()];
        agent(provider.clone(), 20)
            .review_changes(&changes(1), Some("Check SQL queries"), &focus)
            .await;

        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Focus Areas: security, performance"));
        assert!(prompt.contains("Custom Instructions: Check SQL queries"));
    }

    #[tokio::test]
    async fn backend_failure_becomes_error_review() {
        let provider = MockProvider::failing("connection refused");
        let review = agent(provider, 20).review_changes(&changes(2), None, &[]).await;

        assert_eq!(review.overall_assessment, "error");
        assert!(review.summary.starts_with("Review failed with error: "));
        assert!(review.summary.contains("connection refused"));
        assert_eq!(review.files_reviewed, 2);
        assert_eq!(review.total_changes, TotalChanges { additions: 4, deletions: 2 });
        assert_eq!(review.comments.len(), 1);
        let comment = &review.comments[0];
        assert_eq!(comment.category, "system");
        assert_eq!(comment.file_path, "N/A");
        assert_eq!(comment.severity, ReviewSeverity::Error);
        assert!(comment.message.starts_with("Review process failed: "));
        assert!(review.metadata["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_response_becomes_error_review() {
        let provider = MockProvider::replying("this is not json");
        let review = agent(provider, 20).review_changes(&changes(1), None, &[]).await;
        assert_eq!(review.overall_assessment, "error");
        assert_eq!(review.comments.len(), 1);
        assert!(review.metadata.contains_key("error"));
    }

    #[tokio::test]
    async fn invalid_severity_becomes_error_review() {
        let provider = MockProvider::replying(&REPLY.replace("\"info\"", "\"blocker\""));
        let review = agent(provider, 20).review_changes(&changes(1), None, &[]).await;
        assert_eq!(review.overall_assessment, "error");
        assert!(review.metadata["error"].as_str().unwrap().contains("blocker"));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let provider = Arc::new(MockProvider {
            reply: Ok(REPLY.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            delay: Some(Duration::from_secs(30)),
        });
        let mut config = Config::default();
        config.provider.timeout_secs = 1;
        let agent = ReviewAgent::new(provider, &config);

        let review = agent.review_changes(&changes(1), None, &[]).await;
        assert_eq!(review.overall_assessment, "error");
        assert!(review.summary.contains("timed out after 1 seconds"));
    }
}
