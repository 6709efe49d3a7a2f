//! Advisory session: a chat grounded in one completed analysis.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::advisory::engine::ConversationEngine;
use crate::advisory::prompts::{
    ADVISOR_SYSTEM_TEMPLATE, APOLOGY_REPLY, FALLBACK_REPLY, GREETING_TEMPLATE,
};
use crate::advisory::AdvisoryError;
use crate::models::analysis::AnalysisResult;
use crate::models::conversation::ConversationTurn;

/// Shared handle to one advisory session. The async mutex serializes turns.
pub type SessionHandle = Arc<Mutex<AdvisorySession>>;

pub struct AdvisorySession {
    analysis_id: Uuid,
    system_prompt: String,
    /// turns[0] is the local greeting; the rest alternate user/assistant.
    turns: Vec<ConversationTurn>,
    engine: Arc<dyn ConversationEngine>,
}

impl AdvisorySession {
    /// Seeds a session with the full serialized analysis as durable context.
    pub fn open(
        analysis_id: Uuid,
        result: &AnalysisResult,
        engine: Arc<dyn ConversationEngine>,
    ) -> Result<Self, AdvisoryError> {
        let analysis_json = serde_json::to_string(result)?;
        let system_prompt = ADVISOR_SYSTEM_TEMPLATE.replace("{analysis_json}", &analysis_json);

        info!("Opened advisory session for analysis {analysis_id}");

        Ok(Self {
            analysis_id,
            system_prompt,
            turns: vec![ConversationTurn::assistant(greeting(result))],
            engine,
        })
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn analysis_id(&self) -> Uuid {
        self.analysis_id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Appends the user turn and the assistant reply, returning the reply.
    ///
    /// Engine failures never escape: they become an apology turn and the
    /// session stays usable. Only blank input is an error, and it leaves the
    /// transcript untouched. Both turns are committed together once the
    /// engine has answered, so a dropped call leaves no unanswered turn.
    pub async fn send(&mut self, user_text: &str) -> Result<String, AdvisoryError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(AdvisoryError::EmptyMessage);
        }

        let question = ConversationTurn::user(text);
        let mut history = self.turns[1..].to_vec();
        history.push(question.clone());

        let reply = match self.engine.reply(&self.system_prompt, &history).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                warn!("Advisory turn failed for analysis {}: {e}", self.analysis_id);
                APOLOGY_REPLY.to_string()
            }
        };

        self.turns.push(question);
        self.turns.push(ConversationTurn::assistant(reply.clone()));
        Ok(reply)
    }
}

fn greeting(result: &AnalysisResult) -> String {
    GREETING_TEMPLATE
        .replace("{first_name}", result.candidate_profile.first_name())
        .replace("{overall_score}", &result.overall_score.to_string())
}
