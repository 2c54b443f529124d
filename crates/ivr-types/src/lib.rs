//! Shared types for the IVR dialogue workspace.
//!
//! This crate holds the vocabulary exchanged between the telephony-facing
//! driver and the dialogue core: the inbound [`TurnEvent`], the per-call
//! [`Phase`], the conversation [`Turn`] history entries, and the outbound
//! [`VoiceDirective`] document (see the [`directive`] module).
//!
//! Everything here is plain data with `serde` support. Decision logic lives
//! in `ivr-dialogue`.

pub mod directive;

pub use directive::{Instruction, ListenMode, VoiceDirective, VoiceSettings};

use serde::{Deserialize, Serialize};

/// Coarse stage of a call's dialogue.
///
/// `HandedOff` and `Terminated` are terminal: once a call reaches either,
/// no further event changes its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening prompt; the caller has not said anything meaningful yet.
    #[default]
    Greeting,
    /// The caller spoke and a reply is being produced.
    Conversing,
    /// A reply was delivered; waiting to see whether the caller continues.
    Followup,
    /// The call was transferred to a human agent.
    HandedOff,
    /// The call was ended by the system.
    Terminated,
}

impl Phase {
    /// Returns `true` for phases that accept no further mutating events.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::HandedOff | Self::Terminated)
    }

    /// Returns the string label for this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Conversing => "conversing",
            Self::Followup => "followup",
            Self::HandedOff => "handed_off",
            Self::Terminated => "terminated",
        }
    }

    /// Whether the dialogue may move from `self` to `next`.
    ///
    /// Staying in the same non-terminal phase is allowed (reprompts).
    /// `Followup` never re-enters itself directly; a new utterance passes
    /// through `Conversing` first.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (Greeting, Greeting | Conversing | HandedOff | Terminated) => true,
            (Conversing, Conversing | Followup | HandedOff | Terminated) => true,
            (Followup, Conversing | HandedOff | Terminated) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a line of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The person on the phone.
    Caller,
    /// The system (generated or scripted reply).
    Agent,
}

/// One entry of a call's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn caller(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Caller,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}

/// Result of inspecting caller input for a human-handoff request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The caller asked for a human agent.
    Handoff,
    /// Anything else.
    Normal,
}

/// One inbound turn, as delivered by the telephony platform's webhook.
///
/// Every field except `call_id` may be missing on the wire; missing text
/// fields deserialize to empty strings and are treated as silence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Platform-assigned call identifier.
    #[serde(default)]
    pub call_id: String,
    /// Recognized speech, empty when the caller said nothing.
    #[serde(default)]
    pub utterance_text: String,
    /// DTMF digits pressed during the turn, empty when none.
    #[serde(default)]
    pub keypress: String,
    /// Monotonically increasing turn number used to detect redelivery.
    #[serde(default)]
    pub turn_seq: Option<u64>,
    /// Phase echoed back by the platform from a previous callback URL.
    /// Informational only.
    #[serde(default)]
    pub phase_hint: Option<Phase>,
    /// Attempt counter echoed back by the platform. Informational only.
    #[serde(default)]
    pub attempt_hint: Option<u32>,
}

impl TurnEvent {
    pub fn new(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            ..Self::default()
        }
    }

    pub fn with_utterance(mut self, text: impl Into<String>) -> Self {
        self.utterance_text = text.into();
        self
    }

    pub fn with_keypress(mut self, digits: impl Into<String>) -> Self {
        self.keypress = digits.into();
        self
    }

    pub fn with_turn_seq(mut self, seq: u64) -> Self {
        self.turn_seq = Some(seq);
        self
    }

    /// Trimmed utterance text.
    pub fn utterance(&self) -> &str {
        self.utterance_text.trim()
    }

    /// Trimmed keypress digits.
    pub fn digits(&self) -> &str {
        self.keypress.trim()
    }

    /// Returns `true` if the caller said or pressed anything.
    pub fn has_input(&self) -> bool {
        !self.utterance().is_empty() || !self.digits().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(Phase::HandedOff.is_terminal());
        assert!(Phase::Terminated.is_terminal());
        assert!(!Phase::Greeting.is_terminal());
        assert!(!Phase::Conversing.is_terminal());
        assert!(!Phase::Followup.is_terminal());
    }

    #[test]
    fn terminal_phases_have_no_exits() {
        let all = [
            Phase::Greeting,
            Phase::Conversing,
            Phase::Followup,
            Phase::HandedOff,
            Phase::Terminated,
        ];
        for next in all {
            assert!(!Phase::HandedOff.can_transition_to(next));
            assert!(!Phase::Terminated.can_transition_to(next));
        }
    }

    #[test]
    fn followup_goes_through_conversing() {
        assert!(!Phase::Followup.can_transition_to(Phase::Followup));
        assert!(!Phase::Followup.can_transition_to(Phase::Greeting));
        assert!(Phase::Followup.can_transition_to(Phase::Conversing));
        assert!(!Phase::Greeting.can_transition_to(Phase::Followup));
    }

    #[test]
    fn event_with_missing_fields_is_silence() {
        let event: TurnEvent = serde_json::from_str(r#"{"call_id":"C1"}"#).unwrap();
        assert_eq!(event.call_id, "C1");
        assert!(!event.has_input());
        assert_eq!(event.turn_seq, None);
    }

    #[test]
    fn whitespace_only_input_is_silence() {
        let event = TurnEvent::new("C1").with_utterance("   ").with_keypress(" ");
        assert!(!event.has_input());
        assert!(TurnEvent::new("C1").with_keypress("0").has_input());
    }

    #[test]
    fn event_reads_hints() {
        let event: TurnEvent = serde_json::from_str(
            r#"{"call_id":"C9","utterance_text":"hola","turn_seq":4,"phase_hint":"followup","attempt_hint":1}"#,
        )
        .unwrap();
        assert_eq!(event.turn_seq, Some(4));
        assert_eq!(event.phase_hint, Some(Phase::Followup));
        assert_eq!(event.attempt_hint, Some(1));
        assert_eq!(event.utterance(), "hola");
    }
}
