//! Background tasks for the console driver.
//!
//! Includes:
//! - Sweeping call sessions abandoned mid-dialogue.

use ivr_dialogue::{CallSessionStore, SessionConfig};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Starts the session expiry task.
///
/// Runs indefinitely, dropping sessions idle for longer than
/// `idle_timeout_seconds` and finished sessions older than
/// `terminal_retention_seconds`. Returns immediately when the sweep interval
/// is 0.
pub async fn start_sweep_task(store: Arc<CallSessionStore>, sessions: SessionConfig) {
    if sessions.sweep_interval_seconds == 0 {
        tracing::warn!("session sweep disabled (interval=0)");
        return;
    }

    let interval = Duration::from_secs(sessions.sweep_interval_seconds);
    let idle = sessions.idle_timeout();
    let retention = sessions.terminal_retention();

    tracing::info!(
        interval_seconds = sessions.sweep_interval_seconds,
        idle_timeout_seconds = sessions.idle_timeout_seconds,
        terminal_retention_seconds = sessions.terminal_retention_seconds,
        "starting session sweep task"
    );

    loop {
        sleep(interval).await;

        let removed = store.sweep(idle, retention);
        if removed > 0 {
            tracing::info!(count = removed, remaining = store.len(), "swept expired call sessions");
        } else {
            tracing::debug!(remaining = store.len(), "no expired call sessions");
        }
    }
}
