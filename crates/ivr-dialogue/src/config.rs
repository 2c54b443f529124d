//! Dialogue configuration.
//!
//! Every section deserializes with per-field defaults, so a partial TOML
//! table (or none at all) yields a working configuration.

use crate::error::DialogueError;
use ivr_types::{ListenMode, VoiceSettings};
use serde::Deserialize;
use std::time::Duration;

fn default_max_attempts() -> u32 {
    3
}

fn default_max_context_turns() -> usize {
    10
}

/// Top-level configuration for the dialogue core.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Consecutive silent turns after which a call is terminated.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound on history entries handed to the response generator.
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,

    #[serde(default)]
    pub listen: ListenConfig,

    #[serde(default)]
    pub prompts: Prompts,

    #[serde(default)]
    pub handoff: HandoffConfig,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub collaborators: CollaboratorConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_context_turns: default_max_context_turns(),
            listen: ListenConfig::default(),
            prompts: Prompts::default(),
            handoff: HandoffConfig::default(),
            voice: VoiceSettings::default(),
            collaborators: CollaboratorConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

impl DialogueConfig {
    /// Checks the values that would make the state machine misbehave.
    pub fn validate(&self) -> Result<(), DialogueError> {
        if self.max_attempts == 0 {
            return Err(DialogueError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.handoff.destination.trim().is_empty() {
            return Err(DialogueError::Config(
                "handoff.destination must not be empty".to_string(),
            ));
        }
        if self.handoff.digit.trim().is_empty()
            && self.handoff.keywords.iter().all(|k| k.trim().is_empty())
        {
            return Err(DialogueError::Config(
                "handoff needs a digit or at least one keyword".to_string(),
            ));
        }
        if self.listen.timeout_seconds == 0 {
            return Err(DialogueError::Config(
                "listen.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.collaborators.generation_timeout_ms == 0
            || self.collaborators.synthesis_timeout_ms == 0
        {
            return Err(DialogueError::Config(
                "collaborator timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the platform should collect the caller's next input.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Seconds of silence before the platform reports a no-input turn.
    #[serde(default = "default_listen_timeout")]
    pub timeout_seconds: u32,

    #[serde(default)]
    pub mode: ListenMode,
}

fn default_listen_timeout() -> u32 {
    5
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_listen_timeout(),
            mode: ListenMode::default(),
        }
    }
}

/// Fixed phrases spoken by the system.
#[derive(Debug, Clone, Deserialize)]
pub struct Prompts {
    /// Opening prompt, used on the first silent turn of a call.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Shorter prompt for later silent turns.
    #[serde(default = "default_reprompt")]
    pub reprompt: String,

    /// Spoken before hanging up after too many silent turns.
    #[serde(default = "default_goodbye")]
    pub goodbye: String,

    /// Spoken before hanging up when the caller goes quiet after a reply.
    #[serde(default = "default_followup_goodbye")]
    pub followup_goodbye: String,

    /// Spoken before transferring to a human.
    #[serde(default = "default_transfer_notice")]
    pub transfer_notice: String,

    /// Substituted for the generated reply when generation fails.
    #[serde(default = "default_apology")]
    pub apology: String,
}

fn default_greeting() -> String {
    "Hola, gracias por llamar. ¿En qué puedo ayudarte?".to_string()
}

fn default_reprompt() -> String {
    "No te escuché bien. ¿Podrías repetirlo, por favor?".to_string()
}

fn default_goodbye() -> String {
    "No recibimos respuesta. Gracias por llamar, hasta luego.".to_string()
}

fn default_followup_goodbye() -> String {
    "Gracias por tu llamada. ¡Que tengas un buen día!".to_string()
}

fn default_transfer_notice() -> String {
    "Te voy a comunicar con un agente. Por favor, espera en línea.".to_string()
}

fn default_apology() -> String {
    "Lo siento, tuve un problema para responder. ¿Puedes repetir tu consulta?".to_string()
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            reprompt: default_reprompt(),
            goodbye: default_goodbye(),
            followup_goodbye: default_followup_goodbye(),
            transfer_notice: default_transfer_notice(),
            apology: default_apology(),
        }
    }
}

/// How keywords are matched against the caller's utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    /// Keyword appears anywhere in the text ("deshumanizado" matches "humano").
    #[default]
    Substring,
    /// Keyword equals one whole word of the text.
    Word,
}

/// When and where to hand a call to a human agent.
#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    /// Keypad digit that requests an agent.
    #[serde(default = "default_handoff_digit")]
    pub digit: String,

    /// Words that request an agent, compared case-insensitively.
    #[serde(default = "default_handoff_keywords")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub match_mode: KeywordMatch,

    /// SIP URI or phone number the call is transferred to.
    #[serde(default = "default_transfer_destination")]
    pub destination: String,
}

fn default_handoff_digit() -> String {
    "0".to_string()
}

fn default_handoff_keywords() -> Vec<String> {
    vec!["agente".to_string(), "humano".to_string()]
}

fn default_transfer_destination() -> String {
    "sip:4000@nuxway.sip.twilio.com".to_string()
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            digit: default_handoff_digit(),
            keywords: default_handoff_keywords(),
            match_mode: KeywordMatch::default(),
            destination: default_transfer_destination(),
        }
    }
}

/// Time budgets for outbound collaborator calls.
#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorConfig {
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    #[serde(default = "default_synthesis_timeout_ms")]
    pub synthesis_timeout_ms: u64,
}

fn default_generation_timeout_ms() -> u64 {
    8_000
}

fn default_synthesis_timeout_ms() -> u64 {
    5_000
}

impl CollaboratorConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_millis(self.synthesis_timeout_ms)
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            generation_timeout_ms: default_generation_timeout_ms(),
            synthesis_timeout_ms: default_synthesis_timeout_ms(),
        }
    }
}

/// Session expiry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions untouched for this long are swept.
    #[serde(default = "default_idle_timeout_seconds")]
    pub idle_timeout_seconds: u64,

    /// How long a handed-off or terminated session is kept so late events
    /// still see its final phase.
    #[serde(default = "default_terminal_retention_seconds")]
    pub terminal_retention_seconds: u64,

    /// Period of the background sweep. 0 disables it.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_idle_timeout_seconds() -> u64 {
    600
}

fn default_terminal_retention_seconds() -> u64 {
    60
}

fn default_sweep_interval_seconds() -> u64 {
    30
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    pub fn terminal_retention(&self) -> Duration {
        Duration::from_secs(self.terminal_retention_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout_seconds(),
            terminal_retention_seconds: default_terminal_retention_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}
