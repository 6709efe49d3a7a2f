// Analysis path: ingest an upload, score it against the rubric, decode strictly.
// All model calls go through llm_client, never straight to Anthropic.

pub mod client;
pub mod decode;
pub mod ingest;
pub mod prompts;

use serde::Serialize;
use thiserror::Error;

use crate::analysis::decode::SchemaViolation;
use crate::analysis::ingest::IngestError;
use crate::llm_client::LlmError;

pub use client::AnalysisClient;
pub use ingest::{Ingestor, UploadedFile};

/// Every way an analysis can fail. The UI shows one generic message for all
/// of them; `kind()` keeps the cause distinguishable at the API boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read document: {0}")]
    Read(#[from] IngestError),

    #[error("scoring engine unreachable: {0}")]
    Transport(LlmError),

    #[error("scoring engine response rejected: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    #[error("scoring engine returned no content")]
    EmptyResponse,
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AnalysisError::EmptyResponse,
            other => AnalysisError::Transport(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ReadError,
    TransportError,
    SchemaViolation,
    EmptyResponse,
    /// The request driving the analysis went away before it finished.
    Cancelled,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Read(_) => ErrorKind::ReadError,
            AnalysisError::Transport(_) => ErrorKind::TransportError,
            AnalysisError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            AnalysisError::EmptyResponse => ErrorKind::EmptyResponse,
        }
    }
}
