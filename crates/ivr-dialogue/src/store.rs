//! Concurrent per-call session storage.
//!
//! Sessions live in a [`DashMap`] (sharded locks on the map itself), and
//! each session sits behind its own async mutex. A turn holds that mutex
//! for its whole duration, including collaborator calls, so redelivered or
//! racing events for the same call run one after the other while events
//! for other calls are never blocked.

use crate::session::CallSession;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

/// Exclusive access to one call's session for the duration of a turn.
pub type SessionGuard = OwnedMutexGuard<CallSession>;

type SessionSlot = Arc<Mutex<CallSession>>;

#[derive(Debug, Default)]
pub struct CallSessionStore {
    sessions: DashMap<String, SessionSlot>,
}

impl CallSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns a snapshot of the session for `call_id`, if one exists.
    ///
    /// Waits for any in-flight turn on that call to finish.
    pub async fn get(&self, call_id: &str) -> Option<CallSession> {
        let slot = self
            .sessions
            .get(call_id)
            .map(|entry| Arc::clone(entry.value()))?;
        let session = slot.lock().await;
        (!session.evicted).then(|| session.clone())
    }

    /// Locks the session for `call_id`, creating a fresh `Greeting` session
    /// if none exists.
    pub async fn lock(&self, call_id: &str) -> SessionGuard {
        loop {
            let slot = self.slot(call_id);
            let guard = Arc::clone(&slot).lock_owned().await;
            // The slot may have been swept or removed while we were waiting.
            if !guard.evicted && self.is_current(call_id, &slot) {
                return guard;
            }
        }
    }

    /// Applies `mutate` to the session for `call_id` atomically and returns
    /// the updated state.
    pub async fn upsert<F>(&self, call_id: &str, mutate: F) -> CallSession
    where
        F: FnOnce(&mut CallSession),
    {
        let mut session = self.lock(call_id).await;
        mutate(&mut session);
        session.touch();
        session.clone()
    }

    /// Drops the session for `call_id`. Returns `true` if one was present.
    pub fn remove(&self, call_id: &str) -> bool {
        match self.sessions.remove(call_id) {
            Some((_, slot)) => {
                if let Ok(mut session) = slot.try_lock() {
                    session.evicted = true;
                }
                true
            }
            None => false,
        }
    }

    /// Drops every session idle for at least `max_age`.
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        self.sweep(max_age, max_age)
    }

    /// Drops live sessions idle for `idle` and terminal sessions idle for
    /// `terminal_retention` (capped at `idle`).
    ///
    /// Sessions locked by an in-flight turn are skipped. Returns the number
    /// of sessions removed.
    pub fn sweep(&self, idle: Duration, terminal_retention: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|call_id, slot| match slot.try_lock() {
            Ok(mut session) => {
                if session.is_expired(now, idle, terminal_retention) {
                    session.evicted = true;
                    removed += 1;
                    tracing::debug!(
                        call_id = call_id.as_str(),
                        phase = session.phase.as_str(),
                        "sweeping expired call session"
                    );
                    false
                } else {
                    true
                }
            }
            Err(_) => true,
        });
        removed
    }

    fn is_current(&self, call_id: &str, slot: &SessionSlot) -> bool {
        self.sessions
            .get(call_id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), slot))
    }

    fn slot(&self, call_id: &str) -> SessionSlot {
        if let Some(entry) = self.sessions.get(call_id) {
            return Arc::clone(entry.value());
        }
        let entry = self
            .sessions
            .entry(call_id.to_string())
            .or_insert_with(|| {
                tracing::info!(call_id, "call session created");
                Arc::new(Mutex::new(CallSession::new(call_id)))
            });
        Arc::clone(entry.value())
    }
}
