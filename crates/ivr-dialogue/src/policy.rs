//! Turn decision rules.
//!
//! Silence in `Greeting` or `Conversing` is forgiven `max_attempts - 1`
//! times; the next silent turn ends the call. Silence in `Followup` ends
//! the call immediately.

use crate::config::Prompts;
use crate::session::CallSession;
use ivr_types::{Intent, Phase};

/// What the controller should do with one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Ask again and keep listening.
    Reprompt { message: String, next_attempt: u32 },
    /// Say goodbye and hang up.
    Terminate { message: String },
    /// Transfer the call to a human agent.
    Handoff,
    /// Generate a reply to what the caller said.
    Respond { user_text: String },
}

impl Decision {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reprompt { .. } => "reprompt",
            Self::Terminate { .. } => "terminate",
            Self::Handoff => "handoff",
            Self::Respond { .. } => "respond",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    max_attempts: u32,
    prompts: Prompts,
}

impl ResponsePolicy {
    pub fn new(max_attempts: u32, prompts: Prompts) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            prompts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Picks the next step for `session`.
    ///
    /// `input` is the caller's trimmed utterance (or keypress), `None` for a
    /// silent turn. `intent` is ignored for silent turns. Terminal sessions
    /// are expected to be filtered out by the caller; if one slips through
    /// it is told to terminate again.
    pub fn decide(&self, session: &CallSession, input: Option<&str>, intent: Intent) -> Decision {
        if session.is_terminal() {
            return Decision::Terminate {
                message: self.prompts.goodbye.clone(),
            };
        }

        let Some(text) = input else {
            return self.on_silence(session);
        };

        match intent {
            Intent::Handoff => Decision::Handoff,
            Intent::Normal => Decision::Respond {
                user_text: text.to_string(),
            },
        }
    }

    fn on_silence(&self, session: &CallSession) -> Decision {
        if session.phase == Phase::Followup {
            return Decision::Terminate {
                message: self.prompts.followup_goodbye.clone(),
            };
        }

        let next_attempt = session.attempt.saturating_add(1);
        if next_attempt >= self.max_attempts {
            return Decision::Terminate {
                message: self.prompts.goodbye.clone(),
            };
        }

        let message = if session.phase == Phase::Greeting && session.attempt == 0 {
            self.prompts.greeting.clone()
        } else {
            self.prompts.reprompt.clone()
        };
        Decision::Reprompt {
            message,
            next_attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ResponsePolicy {
        ResponsePolicy::new(3, Prompts::default())
    }

    fn session_in(phase: Phase, attempt: u32) -> CallSession {
        let mut session = CallSession::new("C1");
        session.phase = phase;
        session.attempt = attempt;
        session
    }

    #[test]
    fn greeting_silence_reprompts_then_terminates() {
        let policy = policy();
        let prompts = Prompts::default();

        let first = policy.decide(&session_in(Phase::Greeting, 0), None, Intent::Normal);
        assert_eq!(
            first,
            Decision::Reprompt {
                message: prompts.greeting.clone(),
                next_attempt: 1
            }
        );

        let second = policy.decide(&session_in(Phase::Greeting, 1), None, Intent::Normal);
        assert_eq!(
            second,
            Decision::Reprompt {
                message: prompts.reprompt.clone(),
                next_attempt: 2
            }
        );

        let third = policy.decide(&session_in(Phase::Greeting, 2), None, Intent::Normal);
        assert_eq!(
            third,
            Decision::Terminate {
                message: prompts.goodbye
            }
        );
    }

    #[test]
    fn conversing_silence_uses_short_reprompt() {
        let decision = policy().decide(&session_in(Phase::Conversing, 0), None, Intent::Normal);
        assert_eq!(
            decision,
            Decision::Reprompt {
                message: Prompts::default().reprompt,
                next_attempt: 1
            }
        );
    }

    #[test]
    fn followup_silence_is_terminal_at_any_attempt() {
        let policy = policy();
        for attempt in 0..3 {
            let decision = policy.decide(&session_in(Phase::Followup, attempt), None, Intent::Normal);
            assert_eq!(
                decision,
                Decision::Terminate {
                    message: Prompts::default().followup_goodbye
                }
            );
        }
    }

    #[test]
    fn handoff_intent_wins_in_every_live_phase() {
        let policy = policy();
        for phase in [Phase::Greeting, Phase::Conversing, Phase::Followup] {
            let decision = policy.decide(&session_in(phase, 1), Some("agente"), Intent::Handoff);
            assert_eq!(decision, Decision::Handoff);
        }
    }

    #[test]
    fn input_produces_respond() {
        let decision = policy().decide(
            &session_in(Phase::Followup, 0),
            Some("necesito ayuda con mi router"),
            Intent::Normal,
        );
        assert_eq!(
            decision,
            Decision::Respond {
                user_text: "necesito ayuda con mi router".to_string()
            }
        );
    }

    #[test]
    fn single_attempt_budget_terminates_on_first_silence() {
        let policy = ResponsePolicy::new(1, Prompts::default());
        let decision = policy.decide(&session_in(Phase::Greeting, 0), None, Intent::Normal);
        assert_eq!(decision.kind(), "terminate");
    }

    #[test]
    fn terminal_session_is_told_to_terminate() {
        let decision = policy().decide(
            &session_in(Phase::HandedOff, 0),
            Some("hola"),
            Intent::Normal,
        );
        assert_eq!(decision.kind(), "terminate");
    }
}
