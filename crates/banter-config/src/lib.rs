//! Layered TOML configuration for Banter.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use banter_types::{ConfigError, SamplingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The default model sidecar base URL.
pub const DEFAULT_MODEL_BASE_URL: &str = "http://127.0.0.1:8095";

/// Turns of conversation retained as model context.
pub const DEFAULT_WINDOW_SIZE: usize = 6;

/// Independent candidate draws per turn.
pub const DEFAULT_CANDIDATE_COUNT: usize = 5;

/// Canned reply used when no sampled candidate survives selection.
pub const DEFAULT_ANSWER: &str = "Hmm, I've got nothing. Tell me more?";

/// Budget for a single generation call, in milliseconds.
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 30_000;

/// Long-poll timeout for the transport, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Resolved configuration for a Banter process.
#[derive(Debug, Clone)]
pub struct BanterConfig {
    pub bot_token: String,
    /// Bot username, used to strip leading mentions in group chats.
    pub bot_name: Option<String>,
    pub model_base_url: String,
    pub window_size: usize,
    pub candidate_count: usize,
    pub default_answer: String,
    pub generation_timeout_ms: u64,
    /// Turns processed concurrently across chats. One shared model
    /// backend serializes compute anyway, so the default is 1.
    pub max_concurrent_turns: usize,
    pub poll_timeout_secs: u64,
    pub sampling: SamplingConfig,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

/// Bot section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotSettings {
    pub token: Option<String>,
    pub name: Option<String>,
    pub window_size: Option<usize>,
    pub candidate_count: Option<usize>,
    pub default_answer: Option<String>,
    pub max_concurrent_turns: Option<usize>,
    pub poll_timeout_secs: Option<u64>,
}

/// Model sidecar section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    pub base_url: Option<String>,
    pub generation_timeout_ms: Option<u64>,
}

/// Sampling overrides; unset fields keep the tuned defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingSettings {
    pub max_length: Option<u32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub temperature: Option<f32>,
    pub no_repeat_ngram: Option<u32>,
}

impl SamplingSettings {
    fn resolve(&self) -> SamplingConfig {
        let defaults = SamplingConfig::default();
        SamplingConfig {
            max_length: self.max_length.unwrap_or(defaults.max_length),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            no_repeat_ngram: self.no_repeat_ngram.unwrap_or(defaults.no_repeat_ngram),
        }
    }
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bot_token: Option<String>,
    pub model_base_url: Option<String>,
}

impl BanterConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file (~/.banter/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir();
        let settings = load_settings_file(&config_dir.join("config.toml"));

        // Resolve the bot token: CLI > env > config file. Required.
        let bot_token = overrides
            .bot_token
            .or_else(|| std::env::var("BANTER_BOT_TOKEN").ok())
            .or(settings.bot.token)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "bot token (set BANTER_BOT_TOKEN or add to ~/.banter/config.toml)".into(),
            })?;

        let model_base_url = overrides
            .model_base_url
            .or_else(|| std::env::var("BANTER_MODEL_URL").ok())
            .or(settings.model.base_url)
            .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string());

        let window_size = settings.bot.window_size.unwrap_or(DEFAULT_WINDOW_SIZE);
        if window_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bot.window_size".into(),
                message: "must be at least 1".into(),
            });
        }

        let candidate_count = settings
            .bot
            .candidate_count
            .unwrap_or(DEFAULT_CANDIDATE_COUNT);
        if candidate_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bot.candidate_count".into(),
                message: "must be at least 1".into(),
            });
        }

        let max_concurrent_turns = settings.bot.max_concurrent_turns.unwrap_or(1);
        if max_concurrent_turns == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bot.max_concurrent_turns".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(BanterConfig {
            bot_token,
            bot_name: settings.bot.name,
            model_base_url,
            window_size,
            candidate_count,
            default_answer: settings
                .bot
                .default_answer
                .unwrap_or_else(|| DEFAULT_ANSWER.to_string()),
            generation_timeout_ms: settings
                .model
                .generation_timeout_ms
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_MS),
            max_concurrent_turns,
            poll_timeout_secs: settings
                .bot
                .poll_timeout_secs
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            sampling: settings.sampling.resolve(),
        })
    }
}

/// Get the Banter config directory path (~/.banter/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BANTER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".banter")
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &std::path::Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_empty() {
        let settings = SettingsFile::default();
        assert!(settings.bot.token.is_none());
        assert!(settings.model.base_url.is_none());
        assert!(settings.sampling.top_k.is_none());
    }

    #[test]
    fn settings_toml_parse() {
        let toml_str = r#"
[bot]
token = "123:abc"
name = "banterbot"
window_size = 4
candidate_count = 7

[model]
base_url = "http://10.0.0.2:8095"
generation_timeout_ms = 12000
"#;
        let settings: SettingsFile = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.bot.token.as_deref(), Some("123:abc"));
        assert_eq!(settings.bot.name.as_deref(), Some("banterbot"));
        assert_eq!(settings.bot.window_size, Some(4));
        assert_eq!(settings.bot.candidate_count, Some(7));
        assert_eq!(
            settings.model.base_url.as_deref(),
            Some("http://10.0.0.2:8095")
        );
        assert_eq!(settings.model.generation_timeout_ms, Some(12000));
    }

    #[test]
    fn sampling_overrides_merge_over_defaults() {
        let toml_str = r#"
[sampling]
temperature = 0.9
top_k = 40
"#;
        let settings: SettingsFile = toml::from_str(toml_str).unwrap();
        let sampling = settings.sampling.resolve();
        assert!((sampling.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(sampling.top_k, 40);
        // Untouched fields keep the tuned defaults.
        assert_eq!(sampling.max_length, 2048);
        assert!((sampling.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(sampling.no_repeat_ngram, 3);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let toml_str = r#"
[bot]
token = "123:abc"
"#;
        let settings: SettingsFile = toml::from_str(toml_str).unwrap();
        assert!(settings.model.base_url.is_none());
        assert!(settings.sampling.temperature.is_none());
    }
}
