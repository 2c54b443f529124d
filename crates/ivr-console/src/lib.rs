//! Line-oriented driver for the IVR dialogue controller.
//!
//! Reads turn events as JSON lines, answers each with a voice directive, and
//! keeps the session store bounded with a periodic sweep.

pub mod background;
pub mod config;
pub mod driver;

use ivr_dialogue::{CallSessionStore, DialogueController, DialogueError};
use std::sync::Arc;

/// Builds a controller backed by the configured scripted responder.
///
/// # Errors
///
/// Returns [`DialogueError::Config`] if the dialogue settings are invalid.
pub fn build_controller(
    config: &config::Config,
    store: Arc<CallSessionStore>,
) -> Result<DialogueController, DialogueError> {
    let responder = Arc::new(config.responder.build());
    DialogueController::new(&config.dialogue, store, responder)
}
