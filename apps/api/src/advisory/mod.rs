// Advisory chat: a conversation seeded with one completed analysis.
// All model calls go through llm_client, never straight to Anthropic.

pub mod engine;
pub mod prompts;
pub mod session;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use engine::ConversationEngine;
pub use session::{AdvisorySession, SessionHandle};

/// A failed conversational turn. Handled inside the session, never surfaced
/// to the state machine.
#[derive(Debug, Error)]
#[error("advisory turn failed: {0}")]
pub struct ChatTransportError(#[from] pub LlmError);

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("message text cannot be empty")]
    EmptyMessage,

    #[error("failed to serialize analysis context: {0}")]
    Context(#[from] serde_json::Error),
}
