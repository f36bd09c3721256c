//! Runtime configuration for the student economy.
//!
//! # Responsibility
//! - Parse the TOML config file into typed, fully-defaulted settings.
//! - Reject settings that would break ledger or quota invariants.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid config.
//! - API keys are never read from the file, only from the environment
//!   variable named by `gemini.api_key_env`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One week in milliseconds.
pub const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Point and quota rules applied to every student.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyPolicy {
    /// Balance granted when an account is first created.
    pub initial_balance: i64,
    /// Free AI actions per reset period.
    pub weekly_free_uses: i64,
    /// A reset applies once strictly more than this has elapsed.
    pub reset_period_ms: i64,
    /// Points debited for an AI action once free uses are exhausted.
    pub ai_action_cost: i64,
    /// Points credited for an admitted comment.
    pub comment_reward: i64,
    pub min_comment_chars: usize,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            initial_balance: 10,
            weekly_free_uses: 1,
            reset_period_ms: WEEK_MS,
            ai_action_cost: 3,
            comment_reward: 1,
            min_comment_chars: 20,
        }
    }
}

impl EconomyPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_balance < 0 {
            return Err(ConfigError::Invalid(format!(
                "economy.initial_balance must be >= 0, got {}",
                self.initial_balance
            )));
        }
        if self.weekly_free_uses < 0 {
            return Err(ConfigError::Invalid(format!(
                "economy.weekly_free_uses must be >= 0, got {}",
                self.weekly_free_uses
            )));
        }
        if self.reset_period_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "economy.reset_period_ms must be > 0, got {}",
                self.reset_period_ms
            )));
        }
        if self.ai_action_cost <= 0 {
            return Err(ConfigError::Invalid(format!(
                "economy.ai_action_cost must be > 0, got {}",
                self.ai_action_cost
            )));
        }
        if self.comment_reward <= 0 {
            return Err(ConfigError::Invalid(format!(
                "economy.comment_reward must be > 0, got {}",
                self.comment_reward
            )));
        }
        Ok(())
    }
}

/// Gemini endpoint settings used by the verifier and summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiConfig {
    /// API root, without the `/models/...` suffix.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Article text beyond this many characters is not sent to the model.
    pub max_article_chars: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
            max_article_chars: 2000,
        }
    }
}

impl GeminiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gemini.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() || self.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "gemini.base_url and gemini.model cannot be empty".to_string(),
            ));
        }
        if self.max_article_chars == 0 {
            return Err(ConfigError::Invalid(
                "gemini.max_article_chars must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Top-level config file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub economy: EconomyPolicy,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Parses and validates config text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.economy.validate()?;
        self.gemini.validate()
    }
}
