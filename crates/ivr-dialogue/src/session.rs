//! Per-call dialogue state.

use crate::error::DialogueError;
use ivr_types::{Phase, Turn, VoiceDirective};
use std::time::Duration;
use tokio::time::Instant;

/// State of one live phone call.
#[derive(Debug, Clone)]
pub struct CallSession {
    pub call_id: String,
    pub phase: Phase,
    /// Consecutive silent turns in the current phase.
    pub attempt: u32,
    /// Conversation so far, oldest first. Append-only.
    pub history: Vec<Turn>,
    pub created_at: Instant,
    pub last_activity_at: Instant,
    /// Highest `turn_seq` already answered.
    pub last_turn_seq: Option<u64>,
    /// Directive returned for `last_turn_seq`, replayed on redelivery.
    pub last_directive: Option<VoiceDirective>,
    /// Set by the sweep when the session is dropped from the store.
    pub(crate) evicted: bool,
}

impl CallSession {
    pub fn new(call_id: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            call_id: call_id.into(),
            phase: Phase::Greeting,
            attempt: 0,
            history: Vec::new(),
            created_at: now,
            last_activity_at: now,
            last_turn_seq: None,
            last_directive: None,
            evicted: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Moves to `next`, resetting `attempt` when the phase changes.
    pub fn advance(&mut self, next: Phase) -> Result<(), DialogueError> {
        if !self.phase.can_transition_to(next) {
            return Err(DialogueError::InvalidTransition {
                call_id: self.call_id.clone(),
                from: self.phase,
                to: next,
            });
        }
        if next != self.phase {
            self.attempt = 0;
        }
        self.phase = next;
        Ok(())
    }

    /// Forces the session into `Terminated`, whatever its current phase.
    ///
    /// Only used to recover from a broken invariant; regular termination
    /// goes through [`advance`](Self::advance).
    pub(crate) fn abort(&mut self) {
        self.phase = Phase::Terminated;
        self.attempt = 0;
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// The most recent `max` history entries.
    pub fn recent_history(&self, max: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(max);
        &self.history[start..]
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Instant::now();
    }

    /// Returns `true` if `turn_seq` was already answered.
    pub fn is_replay(&self, turn_seq: Option<u64>) -> bool {
        match (turn_seq, self.last_turn_seq) {
            (Some(seq), Some(last)) => seq <= last && self.last_directive.is_some(),
            _ => false,
        }
    }

    /// Stores the answer for `turn_seq` so redeliveries can replay it.
    pub fn record_answer(&mut self, turn_seq: Option<u64>, directive: &VoiceDirective) {
        if let Some(seq) = turn_seq {
            self.last_turn_seq = Some(seq);
            self.last_directive = Some(directive.clone());
        }
    }

    /// Whether the sweep should drop this session at `now`.
    ///
    /// Terminal sessions use the shorter of the two windows.
    pub fn is_expired(&self, now: Instant, idle: Duration, terminal_retention: Duration) -> bool {
        let quiet = now.saturating_duration_since(self.last_activity_at);
        if self.is_terminal() {
            quiet >= terminal_retention.min(idle)
        } else {
            quiet >= idle
        }
    }
}
