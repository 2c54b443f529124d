//! Interfaces to the external services the controller calls out to.
//!
//! Network clients for a real LLM or TTS vendor implement these traits
//! outside this crate. [`ScriptedResponder`] is a self-contained generator
//! for deployments (and tests) that answer from a fixed table.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use ivr_types::Turn;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Conversation passed to the response generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    pub call_id: String,
    /// Most recent turns, oldest first, excluding the utterance being answered.
    pub history: Vec<Turn>,
}

/// Produces the short spoken reply to a caller utterance.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        context: &ConversationContext,
        utterance: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Renders reply text to audio and returns a URL the platform can fetch.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Awaits `call` for at most `limit`. An elapsed timer counts as a failure.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CollaboratorError::Timeout(limit))?
}

/// One keyword rule of a [`ScriptedResponder`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptedReply {
    pub keyword: String,
    pub reply: String,
}

/// Answers from an ordered keyword table, falling back to a default reply.
///
/// The first rule whose keyword appears (case-insensitively) in the
/// utterance wins.
#[derive(Debug, Clone)]
pub struct ScriptedResponder {
    rules: Vec<ScriptedReply>,
    default_reply: String,
}

impl ScriptedResponder {
    pub fn new(rules: Vec<ScriptedReply>, default_reply: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| ScriptedReply {
                keyword: rule.keyword.trim().to_lowercase(),
                reply: rule.reply,
            })
            .filter(|rule| !rule.keyword.is_empty())
            .collect();
        Self {
            rules,
            default_reply: default_reply.into(),
        }
    }

    fn lookup(&self, utterance: &str) -> &str {
        let text = utterance.to_lowercase();
        self.rules
            .iter()
            .find(|rule| text.contains(rule.keyword.as_str()))
            .map(|rule| rule.reply.as_str())
            .unwrap_or(self.default_reply.as_str())
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedResponder {
    async fn generate(
        &self,
        _context: &ConversationContext,
        utterance: &str,
    ) -> Result<String, CollaboratorError> {
        let reply = self.lookup(utterance);
        if reply.trim().is_empty() {
            return Err(CollaboratorError::EmptyReply);
        }
        Ok(reply.to_string())
    }
}
