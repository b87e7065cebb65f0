//! Azure OpenAI chat-completions backend.
//!
//! Talks to a deployment's REST endpoint directly with reqwest:
//! `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
//! authenticated with the `api-key` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::constants::{ENV_AZURE_DEPLOYMENT, ENV_AZURE_ENDPOINT};

use super::{ProviderError, ReviewProvider};

/// Longest error body echoed back in an [`ProviderError::ApiError`].
const ERROR_BODY_PREVIEW_LEN: usize = 500;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Azure OpenAI backend. The configured model is the deployment name.
pub struct AzureOpenAiProvider {
    client: Client,
    url: String,
    api_key: String,
    temperature: f64,
}

impl AzureOpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let endpoint = config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Azure OpenAI endpoint missing. Set {ENV_AZURE_ENDPOINT}."
            ))
        })?;
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {}.",
                config.name,
                config.name.api_key_env_var()
            ))
        })?;

        let deployment = config.model_name().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Azure OpenAI deployment missing. Set {ENV_AZURE_DEPLOYMENT}."
            ))
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: completions_url(endpoint, deployment, &config.api_version),
            api_key,
            temperature: config.temperature,
        })
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}

#[async_trait]
impl ReviewProvider for AzureOpenAiProvider {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Azure OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW_LEN).collect();
            return Err(ProviderError::ApiError(format!(
                "Azure OpenAI returned HTTP {status}: {preview}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("invalid completion payload: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::ParseError("completion contained no message content".into()))
    }
}
