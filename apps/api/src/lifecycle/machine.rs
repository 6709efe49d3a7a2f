//! Upload / analyze / display state machine.
//!
//! ```text
//! Idle --file_selected--> Uploading --document_read--> Analyzing --analysis_succeeded--> Complete
//!                            |                            |
//!                            +------analysis_failed-------+--------------------------> Error
//! Complete | Error --reset_requested--> Idle
//! ```
//!
//! Any other (state, event) pair is rejected and leaves the state unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::advisory::SessionHandle;
use crate::analysis::ErrorKind;
use crate::models::analysis::{AnalysisResult, ScoreBand};

/// The only failure text users see, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to analyze resume. Please ensure you are using a valid PDF or plain-text file and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Uploading,
    Analyzing,
    Complete,
    Error,
}

/// A finished analysis plus the advisory chat opened on it, if any.
pub struct CompletedAnalysis {
    pub analysis_id: Uuid,
    pub result: Arc<AnalysisResult>,
    pub completed_at: DateTime<Utc>,
    pub advisor: Option<SessionHandle>,
}

#[derive(Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Complete(CompletedAnalysis),
    Error { message: String, kind: ErrorKind },
}

#[derive(Debug)]
pub enum Event {
    FileSelected,
    DocumentRead,
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(ErrorKind),
    ResetRequested,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::FileSelected => "file_selected",
            Event::DocumentRead => "document_read",
            Event::AnalysisSucceeded(_) => "analysis_succeeded",
            Event::AnalysisFailed(_) => "analysis_failed",
            Event::ResetRequested => "reset_requested",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{event}' is not allowed while {from:?}")]
pub struct InvalidTransition {
    pub from: Phase,
    pub event: &'static str,
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        match self {
            Lifecycle::Idle => Phase::Idle,
            Lifecycle::Uploading => Phase::Uploading,
            Lifecycle::Analyzing => Phase::Analyzing,
            Lifecycle::Complete(_) => Phase::Complete,
            Lifecycle::Error { .. } => Phase::Error,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Lifecycle::Uploading | Lifecycle::Analyzing)
    }

    pub fn apply(&mut self, event: Event) -> Result<(), InvalidTransition> {
        let next = match (&*self, event) {
            (Lifecycle::Idle, Event::FileSelected) => Lifecycle::Uploading,
            (Lifecycle::Uploading, Event::DocumentRead) => Lifecycle::Analyzing,
            (Lifecycle::Analyzing, Event::AnalysisSucceeded(result)) => {
                Lifecycle::Complete(CompletedAnalysis {
                    analysis_id: Uuid::new_v4(),
                    result: Arc::new(result),
                    completed_at: Utc::now(),
                    advisor: None,
                })
            }
            (Lifecycle::Uploading | Lifecycle::Analyzing, Event::AnalysisFailed(kind)) => {
                Lifecycle::Error {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                    kind,
                }
            }
            // Dropping the completed analysis also drops its advisory session.
            (Lifecycle::Complete(_) | Lifecycle::Error { .. }, Event::ResetRequested) => {
                Lifecycle::Idle
            }
            (state, event) => {
                return Err(InvalidTransition {
                    from: state.phase(),
                    event: event.name(),
                })
            }
        };
        *self = next;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            phase: self.phase(),
            analysis_id: None,
            completed_at: None,
            result: None,
            score_band: None,
            message: None,
            error_kind: None,
        };
        match self {
            Lifecycle::Complete(done) => {
                snapshot.analysis_id = Some(done.analysis_id);
                snapshot.completed_at = Some(done.completed_at);
                snapshot.score_band = Some(done.result.score_band());
                snapshot.result = Some(AnalysisResult::clone(&done.result));
            }
            Lifecycle::Error { message, kind } => {
                snapshot.message = Some(message.clone());
                snapshot.error_kind = Some(*kind);
            }
            Lifecycle::Idle | Lifecycle::Uploading | Lifecycle::Analyzing => {}
        }
        snapshot
    }
}

/// What the presentation layer renders for one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}
