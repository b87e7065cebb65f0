//! Output renderers: terminal report and JSON.

pub mod json;
pub mod terminal;

use crate::models::CodeReview;

/// Trait for rendering a review result to an output format.
pub trait OutputRenderer {
    /// Render a review to a string.
    fn render(&self, review: &CodeReview) -> String;
}
