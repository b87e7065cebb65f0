//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (including a `.env` file loaded by `main`)
//! 3. `.co-reviewer.toml` in the repo root
//! 4. `~/.config/co-reviewer/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! The loaded [`Config`] is immutable for the rest of the process and is
//! handed to each component constructor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::*;
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub review: ReviewConfig,
}

/// Diff extraction and review limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base branch used when a request does not name one.
    pub default_base_branch: String,
    /// Maximum patch length per file, in characters.
    pub max_diff_size: usize,
    /// Maximum number of files sent to the model in one review.
    pub max_files_per_review: usize,
    /// Unchanged lines of context around each hunk.
    pub include_context_lines: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            default_base_branch: DEFAULT_BASE_BRANCH.to_string(),
            max_diff_size: DEFAULT_MAX_DIFF_SIZE,
            max_files_per_review: DEFAULT_MAX_FILES_PER_REVIEW,
            include_context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// LLM provider configuration.
///
/// For Azure, `model` is the deployment name and `base_url` the resource
/// endpoint (e.g. `https://my-resource.openai.azure.com/`). An unset
/// `model` falls back to [`ProviderName::default_model`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_version: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// The configured model, or the selected provider's default.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().or(self.name.default_model())
    }

    /// Upper bound for a single backend call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Azure,
            model: None,
            base_url: None,
            api_key: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_review = ReviewConfig::default();
        if other.review.default_base_branch != default_review.default_base_branch {
            self.review.default_base_branch = other.review.default_base_branch;
        }
        if other.review.max_diff_size != default_review.max_diff_size {
            self.review.max_diff_size = other.review.max_diff_size;
        }
        if other.review.max_files_per_review != default_review.max_files_per_review {
            self.review.max_files_per_review = other.review.max_files_per_review;
        }
        if other.review.include_context_lines != default_review.include_context_lines {
            self.review.include_context_lines = other.review.include_context_lines;
        }

        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model.is_some() {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
        if other.provider.api_version != default_provider.api_version {
            self.provider.api_version = other.provider.api_version;
        }
        if other.provider.temperature != default_provider.temperature {
            self.provider.temperature = other.provider.temperature;
        }
        if other.provider.timeout_secs != default_provider.timeout_secs {
            self.provider.timeout_secs = other.provider.timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    ///
    /// The generic `CO_REVIEWER_*` names win over the Azure-specific ones,
    /// which only apply when the Azure backend is selected.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(name) = env.parsed::<ProviderName>(ENV_PROVIDER) {
            self.provider.name = name;
        }

        if self.provider.name == ProviderName::Azure {
            if let Some(val) = env.var(ENV_AZURE_DEPLOYMENT) {
                self.provider.model = Some(val);
            }
            if let Some(val) = env.var(ENV_AZURE_ENDPOINT) {
                self.provider.base_url = Some(val);
            }
            if let Some(val) = env.var(ENV_AZURE_API_VERSION) {
                self.provider.api_version = val;
            }
        }
        if let Some(val) = env.var(ENV_MODEL) {
            self.provider.model = Some(val);
        }
        if let Some(val) = env.var(ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .var(ENV_API_KEY)
            .or_else(|| env.var(self.provider.name.api_key_env_var()));
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Some(val) = env.parsed(ENV_TEMPERATURE) {
            self.provider.temperature = val;
        }
        if let Some(val) = env.parsed(ENV_TIMEOUT_SECS) {
            self.provider.timeout_secs = val;
        }

        if let Some(val) = env.var(ENV_DEFAULT_BASE_BRANCH) {
            self.review.default_base_branch = val;
        }
        if let Some(val) = env.parsed(ENV_MAX_DIFF_SIZE) {
            self.review.max_diff_size = val;
        }
        if let Some(val) = env.parsed(ENV_MAX_FILES_PER_REVIEW) {
            self.review.max_files_per_review = val;
        }
        if let Some(val) = env.parsed(ENV_CONTEXT_LINES) {
            self.review.include_context_lines = val;
        }
    }
}
