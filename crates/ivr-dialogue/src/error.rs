use ivr_types::Phase;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Illegal phase transition for call {call_id}: {from} -> {to}")]
    InvalidTransition {
        call_id: String,
        from: Phase,
        to: Phase,
    },
}

/// Failure of an outbound collaborator call (response generation or
/// speech synthesis). Always recovered locally by the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("collaborator timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("collaborator returned an empty reply")]
    EmptyReply,
}
