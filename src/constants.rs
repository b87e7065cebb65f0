//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names
//! and built-in defaults so a rename only requires changing this file.

/// Display name of the tool.
pub const APP_NAME: &str = "co-reviewer";

/// Crate version, shown by `version` and the HTTP root endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.co-reviewer.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".co-reviewer.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "co-reviewer";

// ── Defaults ────────────────────────────────────────────────────────

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_MAX_DIFF_SIZE: usize = 10_000;
pub const DEFAULT_MAX_FILES_PER_REVIEW: usize = 20;
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "CO_REVIEWER_PROVIDER";
pub const ENV_MODEL: &str = "CO_REVIEWER_MODEL";
pub const ENV_API_KEY: &str = "CO_REVIEWER_API_KEY";
pub const ENV_BASE_URL: &str = "CO_REVIEWER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CO_REVIEWER_TIMEOUT_SECS";

pub const ENV_AZURE_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_AZURE_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_AZURE_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

pub const ENV_TEMPERATURE: &str = "LLM_TEMPERATURE";
pub const ENV_DEFAULT_BASE_BRANCH: &str = "DEFAULT_BASE_BRANCH";
pub const ENV_MAX_DIFF_SIZE: &str = "MAX_DIFF_SIZE";
pub const ENV_MAX_FILES_PER_REVIEW: &str = "MAX_FILES_PER_REVIEW";
pub const ENV_CONTEXT_LINES: &str = "INCLUDE_CONTEXT_LINES";
