//! Outbound voice directive definitions.
//!
//! A [`VoiceDirective`] is an ordered list of [`Instruction`]s that the
//! telephony platform executes in sequence. Rendering it into a concrete
//! markup (TwiML or similar) is the job of whatever sits in front of the
//! dialogue core.

use serde::{Deserialize, Serialize};

/// Which input channels the platform should listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenMode {
    /// Speech recognition only.
    Speech,
    /// Keypad digits only.
    Dtmf,
    /// Either speech or keypad digits.
    #[default]
    SpeechAndDtmf,
}

/// Language and voice used when the platform speaks text natively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// BCP-47 language tag passed to the platform's speech engine.
    #[serde(default = "default_language")]
    pub language: String,
    /// Platform voice name.
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_language() -> String {
    "es-ES".to_string()
}

fn default_voice() -> String {
    "Polly.Lupe".to_string()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            voice: default_voice(),
        }
    }
}

/// A single primitive the telephony platform executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Speak text with the platform's native voice.
    Speak {
        text: String,
        language: String,
        voice: String,
    },
    /// Play pre-rendered audio; `fallback_text` is spoken natively if the
    /// audio cannot be fetched.
    PlayAudio { url: String, fallback_text: String },
    /// Wait for the caller's next input.
    ListenForInput { timeout_seconds: u32, mode: ListenMode },
    /// Bridge the call to another party.
    TransferCall { destination: String },
    /// End the call.
    HangUp,
}

/// Ordered instructions answering one inbound turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDirective {
    pub instructions: Vec<Instruction>,
}

impl VoiceDirective {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Text the caller will hear, from `Speak` or the fallback of `PlayAudio`.
    pub fn spoken_text(&self) -> Option<&str> {
        self.instructions.iter().find_map(|i| match i {
            Instruction::Speak { text, .. } => Some(text.as_str()),
            Instruction::PlayAudio { fallback_text, .. } => Some(fallback_text.as_str()),
            _ => None,
        })
    }

    /// Returns `true` if the directive waits for more caller input.
    pub fn listens(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, Instruction::ListenForInput { .. }))
    }

    /// Returns `true` if the directive ends the call.
    pub fn hangs_up(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, Instruction::HangUp))
    }

    /// Transfer destination, if this directive hands the call off.
    pub fn transfer_destination(&self) -> Option<&str> {
        self.instructions.iter().find_map(|i| match i {
            Instruction::TransferCall { destination } => Some(destination.as_str()),
            _ => None,
        })
    }
}
