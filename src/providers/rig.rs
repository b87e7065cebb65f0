//! rig-core integration for non-Azure backends.
//!
//! Uses rig-core's provider clients and Agent abstraction. Supports
//! Anthropic, OpenAI, Gemini, DeepSeek, Groq, and any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;
use crate::models::{CodeReview, ProviderName};

use super::{ProviderError, ReviewProvider};

/// Maximum tokens per completion response.
///
/// Anthropic requires an explicit limit, and some providers (e.g. Gemini)
/// default to one low enough to cut a review short.
const MAX_TOKENS: u64 = 16384;

/// Build a one-shot agent from a rig-core client and prompt it.
macro_rules! prompt_simple {
    ($client:expr, $provider:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent(&$provider.model)
            .preamble($system)
            .temperature($provider.config.temperature)
            .max_tokens(MAX_TOKENS)
            .output_schema::<CodeReview>()
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based backend. `config.name` selects the rig-core provider.
pub struct RigProvider {
    config: ProviderConfig,
    model: String,
}

impl RigProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var()
            )));
        }
        if config.name == ProviderName::OpenAICompatible && config.base_url.is_none() {
            return Err(ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            ));
        }
        let model = config
            .model_name()
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "provider '{}' has no default model. Set {} or `model` in {}.",
                    config.name,
                    crate::constants::ENV_MODEL,
                    crate::constants::CONFIG_FILENAME
                ))
            })?
            .to_string();
        Ok(Self { config, model })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
        label: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create {label} client: {e}")))?;
        Ok(client)
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }
}

#[async_trait]
impl ReviewProvider for RigProvider {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, self, system_prompt, user_prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key, "OpenAI")?;
                prompt_simple!(client, self, system_prompt, user_prompt, "OpenAI")
            }
            ProviderName::OpenAICompatible => {
                let client = self.build_openai_client(api_key, "OpenAI-compatible")?;
                prompt_simple!(client, self, system_prompt, user_prompt, "OpenAI-compatible")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, self, system_prompt, user_prompt, "Gemini")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, self, system_prompt, user_prompt, "DeepSeek")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, self, system_prompt, user_prompt, "Groq")
            }
            ProviderName::Azure => Err(ProviderError::NotConfigured(
                "Azure OpenAI is served by the Azure backend, not rig-core".to_string(),
            )),
        }
    }
}
