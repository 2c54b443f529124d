//! Per-turn orchestration.
//!
//! [`DialogueController::handle_turn`] is called once per inbound webhook.
//! It locks the call's session, decides what to do, calls the response
//! generator and synthesizer when needed, and returns the directive to send
//! back. It never fails: collaborator problems fall back to an apology or
//! to native speech, and a broken invariant ends the call politely.

use crate::builder::{Speech, VoiceDirectiveBuilder};
use crate::collaborator::{with_timeout, ConversationContext, ResponseGenerator, SpeechSynthesizer};
use crate::config::DialogueConfig;
use crate::error::{CollaboratorError, DialogueError};
use crate::intent::IntentClassifier;
use crate::policy::{Decision, ResponsePolicy};
use crate::session::CallSession;
use crate::store::CallSessionStore;
use ivr_types::{Intent, Phase, Turn, TurnEvent, VoiceDirective};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct DialogueController {
    store: Arc<CallSessionStore>,
    classifier: IntentClassifier,
    policy: ResponsePolicy,
    builder: VoiceDirectiveBuilder,
    generator: Arc<dyn ResponseGenerator>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    max_context_turns: usize,
    generation_timeout: Duration,
    synthesis_timeout: Duration,
    apology: String,
    goodbye: String,
}

impl std::fmt::Debug for DialogueController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueController")
            .field("sessions", &self.store.len())
            .field("max_attempts", &self.policy.max_attempts())
            .field("synthesizer", &self.synthesizer.is_some())
            .field("generation_timeout", &self.generation_timeout)
            .field("synthesis_timeout", &self.synthesis_timeout)
            .finish()
    }
}

impl DialogueController {
    /// Builds a controller without a synthesizer; replies use native speech.
    ///
    /// # Errors
    ///
    /// Returns [`DialogueError::Config`] if `config` fails validation.
    pub fn new(
        config: &DialogueConfig,
        store: Arc<CallSessionStore>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Result<Self, DialogueError> {
        config.validate()?;
        Ok(Self {
            store,
            classifier: IntentClassifier::new(&config.handoff),
            policy: ResponsePolicy::new(config.max_attempts, config.prompts.clone()),
            builder: VoiceDirectiveBuilder::new(config),
            generator,
            synthesizer: None,
            max_context_turns: config.max_context_turns,
            generation_timeout: config.collaborators.generation_timeout(),
            synthesis_timeout: config.collaborators.synthesis_timeout(),
            apology: config.prompts.apology.clone(),
            goodbye: config.prompts.goodbye.clone(),
        })
    }

    /// Renders generated replies to audio with `synthesizer`.
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn store(&self) -> &Arc<CallSessionStore> {
        &self.store
    }

    /// Processes one inbound turn and returns the directive for the platform.
    pub async fn handle_turn(&self, event: &TurnEvent) -> VoiceDirective {
        let call_id = event.call_id.trim();
        if call_id.is_empty() {
            // Nothing to key a session on; answer as a fresh call would.
            warn!("turn event without call_id, answering with greeting");
            let decision = self
                .policy
                .decide(&CallSession::new(""), None, Intent::Normal);
            return self.builder.build(&decision, None);
        }

        let mut session = self.store.lock(call_id).await;

        if session.is_replay(event.turn_seq) {
            if let Some(directive) = session.last_directive.clone() {
                debug!(
                    call_id,
                    turn_seq = ?event.turn_seq,
                    last_turn_seq = ?session.last_turn_seq,
                    "replaying answer for redelivered turn"
                );
                return directive;
            }
        }

        note_hints(&session, event);

        if session.is_terminal() {
            debug!(
                call_id,
                phase = session.phase.as_str(),
                "event for finished call"
            );
            return self.builder.terminal_noop();
        }

        let directive = match self.run_turn(&mut session, event).await {
            Ok(directive) => directive,
            Err(e) => {
                error!(call_id, error = %e, "dialogue invariant violated, ending call");
                session.abort();
                self.builder.build(
                    &Decision::Terminate {
                        message: self.goodbye.clone(),
                    },
                    None,
                )
            }
        };

        session.touch();
        session.record_answer(event.turn_seq, &directive);
        directive
    }

    async fn run_turn(
        &self,
        session: &mut CallSession,
        event: &TurnEvent,
    ) -> Result<VoiceDirective, DialogueError> {
        let input = [event.utterance(), event.digits()]
            .into_iter()
            .find(|s| !s.is_empty());
        let intent = match input {
            Some(_) => self.classifier.classify(event.utterance(), event.digits()),
            None => Intent::Normal,
        };

        let from = session.phase;
        let decision = self.policy.decide(session, input, intent);

        let reply = match &decision {
            Decision::Reprompt { next_attempt, .. } => {
                session.attempt = *next_attempt;
                None
            }
            Decision::Terminate { .. } => {
                session.advance(Phase::Terminated)?;
                info!(call_id = session.call_id.as_str(), "call terminated");
                None
            }
            Decision::Handoff => {
                if let Some(text) = input {
                    session.push_turn(Turn::caller(text));
                }
                session.advance(Phase::HandedOff)?;
                info!(
                    call_id = session.call_id.as_str(),
                    "call handed off to agent"
                );
                None
            }
            Decision::Respond { user_text } => {
                session.advance(Phase::Conversing)?;
                session.attempt = 0;
                let context = ConversationContext {
                    call_id: session.call_id.clone(),
                    history: session.recent_history(self.max_context_turns).to_vec(),
                };
                session.push_turn(Turn::caller(user_text.as_str()));
                let text = self.generate_reply(&context, user_text).await;
                session.push_turn(Turn::agent(text.as_str()));
                let speech = self.render(&session.call_id, text).await;
                session.advance(Phase::Followup)?;
                Some(speech)
            }
        };

        info!(
            call_id = session.call_id.as_str(),
            turn_seq = ?event.turn_seq,
            from = from.as_str(),
            to = session.phase.as_str(),
            attempt = session.attempt,
            decision = decision.kind(),
            "turn handled"
        );

        Ok(self.builder.build(&decision, reply))
    }

    async fn generate_reply(&self, context: &ConversationContext, utterance: &str) -> String {
        let result = with_timeout(
            self.generation_timeout,
            self.generator.generate(context, utterance),
        )
        .await
        .and_then(|reply| {
            let reply = reply.trim();
            if reply.is_empty() {
                Err(CollaboratorError::EmptyReply)
            } else {
                Ok(reply.to_string())
            }
        });

        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    call_id = context.call_id.as_str(),
                    error = %e,
                    "response generation failed, using apology"
                );
                self.apology.clone()
            }
        }
    }

    async fn render(&self, call_id: &str, text: String) -> Speech {
        let Some(synthesizer) = &self.synthesizer else {
            return Speech::Native(text);
        };

        match with_timeout(self.synthesis_timeout, synthesizer.synthesize(&text)).await {
            Ok(url) if !url.trim().is_empty() => Speech::Synthesized { url, text },
            Ok(_) => {
                warn!(call_id, "synthesizer returned no audio url, using native speech");
                Speech::Native(text)
            }
            Err(e) => {
                warn!(call_id, error = %e, "speech synthesis failed, using native speech");
                Speech::Native(text)
            }
        }
    }
}

/// Logs platform-supplied state hints that disagree with the store.
fn note_hints(session: &CallSession, event: &TurnEvent) {
    if let Some(hint) = event.phase_hint {
        if hint != session.phase {
            debug!(
                call_id = session.call_id.as_str(),
                hinted = hint.as_str(),
                stored = session.phase.as_str(),
                "ignoring phase hint"
            );
        }
    }
    if let Some(hint) = event.attempt_hint {
        if hint != session.attempt {
            debug!(
                call_id = session.call_id.as_str(),
                hinted = hint,
                stored = session.attempt,
                "ignoring attempt hint"
            );
        }
    }
}
