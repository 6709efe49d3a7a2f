//! Analysis client: one scoring-engine call per analysis, strictly decoded.
//!
//! The engine is a trait so the Anthropic-backed implementation can be swapped
//! for a deterministic fake in tests. `AppState` carries the client, which
//! holds the engine as `Arc<dyn ScoringEngine>`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::analysis::decode::decode;
use crate::analysis::ingest::{DocumentData, DocumentPayload};
use crate::analysis::prompts::{Rubric, RUBRIC};
use crate::analysis::AnalysisError;
use crate::llm_client::{
    CallOptions, DocumentSource, LlmClient, LlmError, Message, RequestBlock, SCORING_MODEL,
};
use crate::models::analysis::AnalysisResult;

const SCORING_MAX_TOKENS: u32 = 8192;

/// The external scoring engine. Returns the raw text of its answer;
/// `LlmError::EmptyContent` when it produced nothing.
#[async_trait]
pub trait ScoringEngine: Send + Sync {
    async fn score(&self, document: &DocumentPayload, rubric: &Rubric) -> Result<String, LlmError>;
}

#[async_trait]
impl ScoringEngine for LlmClient {
    async fn score(&self, document: &DocumentPayload, rubric: &Rubric) -> Result<String, LlmError> {
        let source = match &document.data {
            DocumentData::Base64(data) => DocumentSource::Base64 {
                media_type: document.media_type.clone(),
                data: data.clone(),
            },
            DocumentData::Text(data) => DocumentSource::Text {
                media_type: document.media_type.clone(),
                data: data.clone(),
            },
        };

        let messages = [Message::user(vec![
            RequestBlock::Document { source },
            RequestBlock::Text {
                text: rubric.instruction.to_string(),
            },
        ])];

        let options = CallOptions {
            model: SCORING_MODEL,
            max_tokens: SCORING_MAX_TOKENS,
            temperature: Some(rubric.temperature),
        };

        self.call_text(options, &rubric.system_prompt(), &messages)
            .await
    }
}

#[derive(Clone)]
pub struct AnalysisClient {
    engine: Arc<dyn ScoringEngine>,
    rubric: Rubric,
}

impl AnalysisClient {
    pub fn new(engine: Arc<dyn ScoringEngine>) -> Self {
        Self {
            engine,
            rubric: RUBRIC,
        }
    }

    pub fn rubric_version(&self) -> &'static str {
        self.rubric.version
    }

    /// Scores one document. Exactly one engine call; no retries.
    pub async fn analyze(&self, document: &DocumentPayload) -> Result<AnalysisResult, AnalysisError> {
        info!(
            "Scoring {:?} ({}, {} bytes) with rubric {}",
            document.file_name, document.media_type, document.size_bytes, self.rubric.version
        );

        let raw = self.engine.score(document, &self.rubric).await?;
        if raw.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        let result = decode(&raw)?;
        for (name, module) in result.modules.iter() {
            debug!(
                "{}: {}/{} ({:?})",
                name.title(),
                module.score,
                module.max_score,
                module.status
            );
        }
        info!(
            "Scored {}: {}/100, percentile {}",
            result.candidate_profile.name, result.overall_score, result.percentile
        );
        Ok(result)
    }
}
