//! Prompt construction for the review model.

use std::sync::LazyLock;

use crate::context::ReviewContext;
use crate::models::CodeReview;

/// Reviewer persona sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer with deep knowledge of \
software engineering best practices, security, performance optimization, and code quality. \
Your goal is to provide constructive, actionable feedback on code changes.";

/// JSON schema of [`CodeReview`], rendered once.
static REVIEW_SCHEMA: LazyLock<String> = LazyLock::new(|| {
    let schema = schemars::schema_for!(CodeReview);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
});

/// Output format directive appended to every user prompt.
pub fn format_instructions() -> String {
    format!(
        "The output must be a single JSON object that conforms to the JSON schema below.\n\
         - \"severity\" MUST be exactly one of: \"info\", \"warning\", \"error\", \"critical\".\n\
         - \"line_number\" is the 1-based line in the new file, or null when the comment \
         is not about a specific line.\n\
         - Do not wrap the object in any other structure.\n\n\
         Here is the output schema:\n```\n{}\n```",
        REVIEW_SCHEMA.as_str()
    )
}

/// Build the user message for an assembled context.
pub fn build_user_prompt(context: &ReviewContext) -> String {
    format!(
        "Review the following code changes and provide comprehensive feedback.\n\n\
         Number of Files: {num_files}\n\
         Total Changes: +{additions} -{deletions}\n\
         Focus Areas: {focus}\n\
         Custom Instructions: {instructions}\n\n\
         CODE CHANGES:\n\
         {changes}\n\n\
         Please analyze these changes and provide:\n\
         1. A summary of what changed\n\
         2. Specific review comments for issues or improvements \
         (categorized by severity: info, warning, error, critical)\n\
         3. Positive feedback on good practices\n\
         4. Overall assessment\n\n\
         Focus on:\n\
         - Code quality and maintainability\n\
         - Potential bugs or logical errors\n\
         - Security vulnerabilities\n\
         - Performance issues\n\
         - Best practices and conventions\n\
         - Testing considerations\n\
         - Documentation needs\n\n\
         {format}\n\n\
         Provide your review in the specified JSON format.",
        num_files = context.num_files,
        additions = context.total_additions,
        deletions = context.total_deletions,
        focus = context.focus_areas,
        instructions = context.custom_instructions,
        changes = context.changes,
        format = format_instructions(),
    )
}
