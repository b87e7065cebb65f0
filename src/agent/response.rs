//! Strict parsing of the model's review response.

use std::sync::LazyLock;

use crate::models::CodeReview;
use crate::providers::ProviderError;

/// Maximum length of response text included in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 500;

/// Regex for extracting content inside markdown code fences.
///
/// The closing ``` must appear at the start of a line so that fences
/// embedded in JSON string values (e.g. a suggestion containing a code
/// sample) are not mistaken for the end of the block.
static FENCE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").expect("fence regex is valid")
});

/// Parse a model response into a [`CodeReview`].
///
/// The JSON object may be surrounded by prose or wrapped in a markdown
/// fence. Schema violations (missing required fields, unknown severity)
/// are errors, never silently defaulted.
pub fn parse_review(response: &str) -> Result<CodeReview, ProviderError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    let mut syntax_error = None;
    let mut schema_error = None;

    for candidate in extract_json_candidates(trimmed) {
        match serde_json::from_str::<CodeReview>(&candidate) {
            Ok(review) => return Ok(review),
            Err(e) if e.is_data() => {
                schema_error.get_or_insert(e);
            }
            Err(e) => {
                syntax_error.get_or_insert(e);
            }
        }
    }

    // A schema mismatch in otherwise valid JSON says more than a syntax
    // error from one of the looser candidates.
    let reason = schema_error
        .or(syntax_error)
        .map(|e| e.to_string())
        .unwrap_or_default();
    let preview: String = trimmed.chars().take(PARSE_ERROR_PREVIEW_LEN).collect();
    Err(ProviderError::ParseError(format!(
        "{reason}. Response: {preview}"
    )))
}

/// Candidate JSON strings, most literal first: the text itself, the
/// outermost `{ ... }` slice, then the inside of each markdown fence.
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = vec![text.to_string()];

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            let slice = &text[start..=end];
            if slice != text {
                candidates.push(slice.to_string());
            }
        }
    }

    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                candidates.push(inner.to_string());
            }
        }
    }

    candidates
}
