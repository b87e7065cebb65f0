//! ReviewProvider trait and LLM backends.
//!
//! Decouples the analysis agent from the HTTP client or LLM library that
//! actually talks to the model.

pub mod azure;
pub mod rig;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

/// Errors from a review backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),
}

/// A chat-completion backend.
///
/// Implementations send one system and one user message and return the
/// model's raw text answer. Parsing is left to the caller.
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

/// Build the backend selected by `config.name`.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ReviewProvider>, ProviderError> {
    tracing::debug!(provider = %config.name, model = ?config.model_name(), "building provider");
    match config.name {
        ProviderName::Azure => Ok(Arc::new(azure::AzureOpenAiProvider::new(config.clone())?)),
        _ => Ok(Arc::new(rig::RigProvider::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: ProviderName) -> ProviderConfig {
        ProviderConfig {
            name,
            api_key: Some("test-key".into()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn azure_requires_endpoint() {
        let err = build_provider(&config(ProviderName::Azure)).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn azure_with_endpoint_builds() {
        let mut cfg = config(ProviderName::Azure);
        cfg.base_url = Some("https://example.openai.azure.com".into());
        assert!(build_provider(&cfg).is_ok());
    }

    #[test]
    fn missing_api_key_is_not_configured() {
        for name in [ProviderName::Azure, ProviderName::Anthropic, ProviderName::Groq] {
            let mut cfg = config(name);
            cfg.api_key = None;
            cfg.base_url = Some("https://example.com".into());
            let err = build_provider(&cfg).err().unwrap();
            assert!(matches!(err, ProviderError::NotConfigured(_)), "{name}");
        }
    }

    #[test]
    fn rig_providers_build_with_key() {
        assert!(build_provider(&config(ProviderName::Anthropic)).is_ok());
        assert!(build_provider(&config(ProviderName::OpenAI)).is_ok());
    }

    #[test]
    fn timeout_error_message() {
        assert_eq!(
            ProviderError::Timeout(30).to_string(),
            "LLM request timed out after 30 seconds"
        );
    }
}
