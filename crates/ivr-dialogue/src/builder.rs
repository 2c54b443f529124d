//! Turns decisions into [`VoiceDirective`] documents.

use crate::config::DialogueConfig;
use crate::policy::Decision;
use ivr_types::{Instruction, ListenMode, VoiceDirective, VoiceSettings};

/// How a piece of text reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speech {
    /// Spoken by the platform's own voice.
    Native(String),
    /// Rendered to audio by the synthesizer; `text` is the spoken fallback.
    Synthesized { url: String, text: String },
}

/// Pure mapping from decisions to directives. Performs no I/O.
#[derive(Debug, Clone)]
pub struct VoiceDirectiveBuilder {
    voice: VoiceSettings,
    listen_timeout_seconds: u32,
    listen_mode: ListenMode,
    destination: String,
    transfer_notice: String,
    apology: String,
}

impl VoiceDirectiveBuilder {
    pub fn new(config: &DialogueConfig) -> Self {
        Self {
            voice: config.voice.clone(),
            listen_timeout_seconds: config.listen.timeout_seconds,
            listen_mode: config.listen.mode,
            destination: config.handoff.destination.clone(),
            transfer_notice: config.prompts.transfer_notice.clone(),
            apology: config.prompts.apology.clone(),
        }
    }

    /// Builds the directive for `decision`.
    ///
    /// `reply` is only read for [`Decision::Respond`]; when it is missing the
    /// configured apology is spoken instead so the call keeps going.
    pub fn build(&self, decision: &Decision, reply: Option<Speech>) -> VoiceDirective {
        match decision {
            Decision::Reprompt { message, .. } => {
                self.prompt_then_listen(Speech::Native(message.clone()))
            }
            Decision::Respond { .. } => {
                let reply = reply.unwrap_or_else(|| Speech::Native(self.apology.clone()));
                self.prompt_then_listen(reply)
            }
            Decision::Terminate { message } => {
                VoiceDirective::new(vec![self.speak(message), Instruction::HangUp])
            }
            Decision::Handoff => VoiceDirective::new(vec![
                self.speak(&self.transfer_notice),
                Instruction::TransferCall {
                    destination: self.destination.clone(),
                },
            ]),
        }
    }

    /// Answer for any event on a call that already ended or was transferred.
    pub fn terminal_noop(&self) -> VoiceDirective {
        VoiceDirective::new(vec![Instruction::HangUp])
    }

    fn prompt_then_listen(&self, speech: Speech) -> VoiceDirective {
        let first = match speech {
            Speech::Native(text) => self.speak(&text),
            Speech::Synthesized { url, text } => Instruction::PlayAudio {
                url,
                fallback_text: text,
            },
        };
        VoiceDirective::new(vec![
            first,
            Instruction::ListenForInput {
                timeout_seconds: self.listen_timeout_seconds,
                mode: self.listen_mode,
            },
        ])
    }

    fn speak(&self, text: &str) -> Instruction {
        Instruction::Speak {
            text: text.to_string(),
            language: self.voice.language.clone(),
            voice: self.voice.voice.clone(),
        }
    }
}
