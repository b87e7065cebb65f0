//! Shared types used across all modules.
//!
//! This module defines the core data structures for change records,
//! review results and review requests. Other modules import from
//! here rather than reaching into each other's internals.

pub mod change;
pub mod request;
pub mod review;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use change::{FileChange, FileChangeType};
pub use request::ReviewRequest;
pub use review::{CodeReview, ReviewComment, ReviewSeverity, TotalChanges};

/// Sentinel file path used for comments that do not refer to a file.
pub const NOT_APPLICABLE: &str = "N/A";

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    /// Azure OpenAI deployment (the default backend).
    #[default]
    Azure,
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Groq,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Azure => write!(f, "azure"),
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::DeepSeek => write!(f, "deepseek"),
            ProviderName::Groq => write!(f, "groq"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" | "azure-openai" => Ok(ProviderName::Azure),
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            "gemini" => Ok(ProviderName::Gemini),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "groq" => Ok(ProviderName::Groq),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: azure, anthropic, openai, \
                 gemini, deepseek, groq, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Model used when none is configured. OpenAI-compatible servers host
    /// arbitrary models, so they have no default.
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            ProviderName::Azure | ProviderName::OpenAI => Some(crate::constants::DEFAULT_MODEL),
            ProviderName::Anthropic => Some("claude-sonnet-4-20250514"),
            ProviderName::Gemini => Some("gemini-2.5-flash"),
            ProviderName::DeepSeek => Some("deepseek-chat"),
            ProviderName::Groq => Some("llama-3.3-70b-versatile"),
            ProviderName::OpenAICompatible => None,
        }
    }

    /// Returns the provider-specific environment variable name for the API key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Azure => "AZURE_OPENAI_API_KEY",
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
        }
    }
}
