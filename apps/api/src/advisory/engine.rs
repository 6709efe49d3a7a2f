//! Conversational engine seam. The Anthropic API is stateless, so the
//! session sends its whole transcript on every turn.

use async_trait::async_trait;

use crate::advisory::ChatTransportError;
use crate::llm_client::{CallOptions, LlmClient, LlmError, Message, ADVISOR_MODEL};
use crate::models::conversation::{ConversationTurn, Role};

const ADVISOR_MAX_TOKENS: u32 = 2048;

#[async_trait]
pub trait ConversationEngine: Send + Sync {
    /// Produces the next assistant reply. `turns` starts with a user turn and
    /// alternates. An empty string means the engine had nothing to say.
    async fn reply(
        &self,
        system: &str,
        turns: &[ConversationTurn],
    ) -> Result<String, ChatTransportError>;
}

#[async_trait]
impl ConversationEngine for LlmClient {
    async fn reply(
        &self,
        system: &str,
        turns: &[ConversationTurn],
    ) -> Result<String, ChatTransportError> {
        let messages: Vec<Message> = turns
            .iter()
            .map(|turn| match turn.role {
                Role::User => Message::user_text(turn.text.as_str()),
                Role::Assistant => Message::assistant_text(turn.text.as_str()),
            })
            .collect();

        let options = CallOptions {
            model: ADVISOR_MODEL,
            max_tokens: ADVISOR_MAX_TOKENS,
            temperature: None,
        };

        match self.call_text(options, system, &messages).await {
            Ok(text) => Ok(text),
            Err(LlmError::EmptyContent) => Ok(String::new()),
            Err(e) => Err(ChatTransportError(e)),
        }
    }
}
