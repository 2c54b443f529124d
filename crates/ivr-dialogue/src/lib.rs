//! Conversational turn controller for a webhook-driven voice IVR.
//!
//! The telephony platform calls in once per caller turn (speech, keypress,
//! or silence). For each turn the [`DialogueController`]:
//!
//! 1. locks the call's [`CallSession`] in the [`CallSessionStore`],
//! 2. checks the input for a human-handoff request ([`IntentClassifier`]),
//! 3. picks the next step ([`ResponsePolicy`]),
//! 4. asks the [`ResponseGenerator`] for a reply and, if configured, the
//!    [`SpeechSynthesizer`] for audio,
//! 5. renders a [`VoiceDirective`](ivr_types::VoiceDirective) with the
//!    [`VoiceDirectiveBuilder`].
//!
//! # Phases
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Greeting` | silence, attempts left | `Greeting` (reprompt) |
//! | `Greeting` / `Conversing` | silence, attempts used up | `Terminated` |
//! | `Greeting` / `Conversing` / `Followup` | handoff request | `HandedOff` |
//! | `Greeting` / `Conversing` / `Followup` | other input | `Conversing`, then `Followup` after the reply |
//! | `Followup` | silence | `Terminated` |
//! | `HandedOff` / `Terminated` | anything | unchanged, hang-up only |

pub mod builder;
pub mod collaborator;
pub mod config;
pub mod controller;
pub mod error;
pub mod intent;
pub mod policy;
pub mod session;
pub mod store;

pub use builder::{Speech, VoiceDirectiveBuilder};
pub use collaborator::{
    ConversationContext, ResponseGenerator, ScriptedReply, ScriptedResponder, SpeechSynthesizer,
};
pub use config::{
    CollaboratorConfig, DialogueConfig, HandoffConfig, KeywordMatch, ListenConfig, Prompts,
    SessionConfig,
};
pub use controller::DialogueController;
pub use error::{CollaboratorError, DialogueError};
pub use intent::IntentClassifier;
pub use policy::{Decision, ResponsePolicy};
pub use session::CallSession;
pub use store::{CallSessionStore, SessionGuard};
