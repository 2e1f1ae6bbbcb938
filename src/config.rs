//! Player and match configuration.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Maximum tokens requested per move reply.
const DEFAULT_MAX_TOKENS: u32 = 256;

/// Configuration for one side of a game. Immutable once a session is
/// created.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Whether this player consults a completion service for moves.
    #[serde(default)]
    use_llm: bool,

    /// Completion-service provider (openai or mistral).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name (e.g., "gpt-4o-mini", "mistral-small-latest").
    #[serde(default = "default_model")]
    model: String,

    /// Sampling temperature, expected in [0, 2].
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl PlayerConfig {
    /// Creates a configuration for a completion-backed player.
    pub fn llm(provider: LlmProvider, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            use_llm: true,
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Creates completion-client configuration from this player config.
    /// Requires the OPENAI_API_KEY or MISTRAL_API_KEY environment variable.
    ///
    /// The model name is passed through unvalidated; an unsupported model
    /// surfaces as a provider error on the first call. Temperature is
    /// clamped into [0, 2].
    #[instrument(skip(self), fields(provider = ?self.provider, model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let api_key = match self.provider {
            LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            LlmProvider::Mistral => std::env::var("MISTRAL_API_KEY").map_err(|_| {
                ConfigError::new("MISTRAL_API_KEY environment variable not set".to_string())
            })?,
        };

        let temperature = if (0.0..=2.0).contains(&self.temperature) {
            self.temperature
        } else {
            let clamped = self.temperature.clamp(0.0, 2.0);
            warn!(
                requested = self.temperature,
                clamped, "Temperature out of range, clamping"
            );
            clamped
        };

        Ok(LlmConfig::new(
            self.provider,
            api_key,
            self.model.clone(),
            temperature,
            DEFAULT_MAX_TOKENS,
        ))
    }
}

/// Player pairing and logging switch for locally-run matches.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Configuration for player X.
    #[serde(default)]
    player_x: PlayerConfig,

    /// Configuration for player O.
    #[serde(default)]
    player_o: PlayerConfig,

    /// Whether moves and outcomes are recorded to the log sink.
    #[serde(default = "default_enable_logging")]
    enable_logging: bool,
}

fn default_enable_logging() -> bool {
    true
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_x: PlayerConfig::default(),
            player_o: PlayerConfig::default(),
            enable_logging: default_enable_logging(),
        }
    }
}

impl MatchConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!("Config loaded successfully");
        Ok(config)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
