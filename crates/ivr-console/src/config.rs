//! Console configuration loading from file and environment variables.

use ivr_dialogue::{DialogueConfig, ScriptedReply, ScriptedResponder};
use serde::Deserialize;
use thiserror::Error;

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Turn controller settings.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Scripted reply table used as the response generator.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Keyword rules for the scripted responder.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponderConfig {
    /// Rules tried in order; the first keyword found in the utterance wins.
    #[serde(default)]
    pub rules: Vec<ScriptedReply>,

    /// Reply used when no rule matches.
    #[serde(default = "default_reply")]
    pub default_reply: String,
}

impl ResponderConfig {
    pub fn build(&self) -> ScriptedResponder {
        ScriptedResponder::new(self.rules.clone(), self.default_reply.clone())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "ivr_dialogue=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_reply() -> String {
    "Entiendo. ¿Me puedes dar más detalles?".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `IVR_LOG_LEVEL` overrides `logging.level`
/// - `IVR_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `IVR_MAX_ATTEMPTS` overrides `dialogue.max_attempts`
/// - `IVR_TRANSFER_DESTINATION` overrides `dialogue.handoff.destination`
/// - `IVR_LANGUAGE` overrides `dialogue.voice.language`
/// - `IVR_VOICE` overrides `dialogue.voice.voice`
/// - `IVR_GENERATION_TIMEOUT_MS` overrides `dialogue.collaborators.generation_timeout_ms`
/// - `IVR_IDLE_TIMEOUT_SECONDS` overrides `dialogue.sessions.idle_timeout_seconds`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(level) = std::env::var("IVR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("IVR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(attempts) = std::env::var("IVR_MAX_ATTEMPTS") {
        if let Ok(parsed) = attempts.parse() {
            config.dialogue.max_attempts = parsed;
        }
    }
    if let Ok(destination) = std::env::var("IVR_TRANSFER_DESTINATION") {
        config.dialogue.handoff.destination = destination;
    }
    if let Ok(language) = std::env::var("IVR_LANGUAGE") {
        config.dialogue.voice.language = language;
    }
    if let Ok(voice) = std::env::var("IVR_VOICE") {
        config.dialogue.voice.voice = voice;
    }
    if let Ok(timeout) = std::env::var("IVR_GENERATION_TIMEOUT_MS") {
        if let Ok(parsed) = timeout.parse() {
            config.dialogue.collaborators.generation_timeout_ms = parsed;
        }
    }
    if let Ok(idle) = std::env::var("IVR_IDLE_TIMEOUT_SECONDS") {
        if let Ok(parsed) = idle.parse() {
            config.dialogue.sessions.idle_timeout_seconds = parsed;
        }
    }

    Ok(config)
}
