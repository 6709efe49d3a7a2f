//! Drives one visitor's state machine through ingest, scoring and chat.
//!
//! The lifecycle lock is a plain mutex and is never held across an `.await`:
//! each step locks, applies one event, and unlocks. The state machine itself
//! rejects a second upload while one is in flight.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::advisory::{AdvisorySession, ConversationEngine, SessionHandle};
use crate::analysis::ingest::IngestError;
use crate::analysis::{AnalysisClient, AnalysisError, ErrorKind, Ingestor, UploadedFile};
use crate::lifecycle::machine::{Event, Lifecycle, Snapshot};
use crate::lifecycle::SessionError;
use crate::models::conversation::ConversationTurn;

/// The collaborators every session shares.
#[derive(Clone)]
pub struct Pipeline {
    pub ingestor: Ingestor,
    pub analysis: AnalysisClient,
    pub advisor_engine: Arc<dyn ConversationEngine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub reply: String,
    pub turns: Vec<ConversationTurn>,
}

pub struct ScanSession {
    id: Uuid,
    lifecycle: Mutex<Lifecycle>,
    last_active: Mutex<DateTime<Utc>>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            lifecycle: Mutex::new(Lifecycle::Idle),
            last_active: Mutex::new(Utc::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn touch(&self) {
        *lock(&self.last_active) = Utc::now();
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        *lock(&self.last_active)
    }

    /// `fileSelected`: reads the upload, ingests it, scores it.
    ///
    /// Analysis failures are not errors of this call: they land the session
    /// in `Error` and the returned snapshot says so. Only an invalid
    /// transition (a session that is not `Idle`) is returned as `Err`.
    pub async fn submit<F>(&self, pipeline: &Pipeline, upload: F) -> Result<Snapshot, SessionError>
    where
        F: Future<Output = Result<UploadedFile, IngestError>>,
    {
        self.apply(Event::FileSelected)?;
        let in_flight = InFlight::new(self);

        let document = match upload
            .await
            .and_then(|file| pipeline.ingestor.ingest(file))
        {
            Ok(document) => document,
            Err(e) => return self.fail(in_flight, e.into()),
        };
        self.apply(Event::DocumentRead)?;

        match pipeline.analysis.analyze(&document).await {
            Ok(result) => {
                in_flight.settle();
                self.apply(Event::AnalysisSucceeded(result))?;
                info!("Session {} analysis complete", self.id);
                Ok(self.snapshot())
            }
            Err(e) => self.fail(in_flight, e),
        }
    }

    /// `resetRequested`: back to `Idle`, dropping the result and any chat.
    pub fn reset(&self) -> Result<Snapshot, SessionError> {
        self.apply(Event::ResetRequested)?;
        info!("Session {} reset", self.id);
        Ok(self.snapshot())
    }

    /// Opens the advisory chat for the current analysis, or returns the one
    /// already open for it.
    pub fn open_advisor(&self, engine: Arc<dyn ConversationEngine>) -> Result<SessionHandle, SessionError> {
        let mut state = self.state();
        match &mut *state {
            Lifecycle::Complete(done) => {
                if let Some(handle) = &done.advisor {
                    return Ok(Arc::clone(handle));
                }
                let handle =
                    AdvisorySession::open(done.analysis_id, &done.result, engine)?.into_handle();
                done.advisor = Some(Arc::clone(&handle));
                Ok(handle)
            }
            other => Err(SessionError::NotComplete(other.phase())),
        }
    }

    pub async fn transcript(&self, engine: Arc<dyn ConversationEngine>) -> Result<Vec<ConversationTurn>, SessionError> {
        let handle = self.open_advisor(engine)?;
        let advisor = handle.lock().await;
        Ok(advisor.turns().to_vec())
    }

    /// `chatMessageSent`: one turn on the advisory chat. Turns on one session
    /// are applied strictly in arrival order.
    pub async fn chat(
        &self,
        engine: Arc<dyn ConversationEngine>,
        text: &str,
    ) -> Result<ChatExchange, SessionError> {
        let handle = self.open_advisor(engine)?;
        let mut advisor = handle.lock().await;
        debug!("Session {} chat turn on analysis {}", self.id, advisor.analysis_id());
        let reply = advisor.send(text).await?;
        Ok(ChatExchange {
            reply,
            turns: advisor.turns().to_vec(),
        })
    }

    fn fail(&self, in_flight: InFlight<'_>, err: AnalysisError) -> Result<Snapshot, SessionError> {
        in_flight.settle();
        error!("Session {} analysis failed ({:?}): {err}", self.id, err.kind());
        self.apply(Event::AnalysisFailed(err.kind()))?;
        Ok(self.snapshot())
    }

    fn apply(&self, event: Event) -> Result<(), SessionError> {
        self.state().apply(event).map_err(SessionError::from)
    }

    fn state(&self) -> MutexGuard<'_, Lifecycle> {
        lock(&self.lifecycle)
    }
}

/// Armed between `FileSelected` and the terminal event. If `submit` is
/// dropped in between (the client went away mid-analysis), the session is
/// moved to `Error` so it can still be reset.
struct InFlight<'a> {
    session: Option<&'a ScanSession>,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a ScanSession) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn settle(mut self) {
        self.session = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            warn!("Session {} analysis abandoned before completion", session.id);
            if let Err(e) = session.state().apply(Event::AnalysisFailed(ErrorKind::Cancelled)) {
                warn!("Session {}: {e}", session.id);
            }
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::engine::fakes::FakeConversationEngine;
    use crate::analysis::client::fakes::{network_failure, FakeScoringEngine, StalledScoringEngine};
    use std::time::Duration;
    use crate::lifecycle::machine::{Phase, GENERIC_FAILURE_MESSAGE};
    use crate::llm_client::LlmError;
    use crate::models::analysis::fixtures::sample_result;
    use bytes::Bytes;
    use serde_json::json;

    fn pipeline(
        scoring: Vec<Result<String, LlmError>>,
    ) -> (Pipeline, Arc<FakeScoringEngine>, Arc<FakeConversationEngine>) {
        let scorer = FakeScoringEngine::with(scoring);
        let advisor = FakeConversationEngine::scripted(vec![]);
        let pipeline = Pipeline {
            ingestor: Ingestor::new(5 * 1024 * 1024),
            analysis: AnalysisClient::new(scorer.clone()),
            advisor_engine: advisor.clone(),
        };
        (pipeline, scorer, advisor)
    }

    fn two_page_pdf() -> Result<UploadedFile, IngestError> {
        Ok(UploadedFile {
            file_name: Some("asha_verma_cv.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.7\n1 0 obj <</Type /Pages /Count 2>> endobj\n%%EOF"),
        })
    }

    fn sample_json() -> String {
        serde_json::to_string(&sample_result()).unwrap()
    }

    #[tokio::test]
    async fn test_scenario_a_complete_then_reset() {
        let (pipeline, _, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();

        let snapshot = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Complete);
        let result = snapshot.result.unwrap();
        assert_eq!(result.overall_score, 72.0);
        assert_eq!(result.percentile, 60.0);
        assert!(!result.top_leverage_fixes.is_empty());

        let snapshot = session.reset().unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.result.is_none());
    }

    #[tokio::test]
    async fn test_scenario_b_network_failure() {
        let (pipeline, _, _) = pipeline(vec![Err(network_failure())]);
        let session = ScanSession::new();

        let snapshot = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Error);
        assert!(!snapshot.message.as_deref().unwrap_or_default().is_empty());
        assert_eq!(snapshot.error_kind, Some(ErrorKind::TransportError));

        assert_eq!(session.reset().unwrap().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_scenario_c_missing_field_treated_like_transport_failure() {
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["candidateProfile"]
            .as_object_mut()
            .unwrap()
            .remove("detectedYoE");
        let (pipeline, _, _) = pipeline(vec![Ok(value.to_string())]);
        let session = ScanSession::new();

        let snapshot = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Error);
        assert_eq!(snapshot.message.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(snapshot.error_kind, Some(ErrorKind::SchemaViolation));
        assert!(snapshot.result.is_none());

        assert_eq!(session.reset().unwrap().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_scenario_d_chat_grounded_in_analysis() {
        let (pipeline, _, advisor) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();

        let exchange = session
            .chat(pipeline.advisor_engine.clone(), "How do I fix my projects section?")
            .await
            .unwrap();

        assert!(exchange.reply.contains("Only one detailed project listed"));
        assert_eq!(exchange.turns.len(), 3);
        let calls = advisor.calls.lock().unwrap();
        assert!(calls[0].0.contains("\"projects\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_analysis_can_be_reset() {
        let (mut pipeline, _, _) = pipeline(vec![]);
        pipeline.analysis = AnalysisClient::new(Arc::new(StalledScoringEngine));
        let session = ScanSession::new();

        let outcome = tokio::time::timeout(
            Duration::from_secs(300),
            session.submit(&pipeline, async { two_page_pdf() }),
        )
        .await;
        assert!(outcome.is_err());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Error);
        assert_eq!(snapshot.error_kind, Some(ErrorKind::Cancelled));
        assert!(!session.is_busy());
        assert_eq!(session.reset().unwrap().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_upload_read_can_be_reset() {
        let (pipeline, scorer, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();

        let outcome = tokio::time::timeout(
            Duration::from_secs(300),
            session.submit(&pipeline, std::future::pending()),
        )
        .await;
        assert!(outcome.is_err());

        assert_eq!(session.snapshot().error_kind, Some(ErrorKind::Cancelled));
        assert_eq!(scorer.call_count(), 0);
        assert_eq!(session.reset().unwrap().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_read_failure_lands_in_error_without_engine_call() {
        let (pipeline, scorer, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();

        let snapshot = session
            .submit(&pipeline, async {
                Err(IngestError::Interrupted("connection reset".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Error);
        assert_eq!(snapshot.error_kind, Some(ErrorKind::ReadError));
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_read_error() {
        let (mut pipeline, scorer, _) = pipeline(vec![Ok(sample_json())]);
        pipeline.ingestor = Ingestor::new(4);
        let session = ScanSession::new();

        let snapshot = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        assert_eq!(snapshot.error_kind, Some(ErrorKind::ReadError));
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_upload_rejected_until_reset() {
        let (pipeline, scorer, _) = pipeline(vec![Ok(sample_json()), Ok(sample_json())]);
        let session = ScanSession::new();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();

        let err = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
        assert_eq!(scorer.call_count(), 1);
        assert_eq!(session.snapshot().phase, Phase::Complete);
    }

    #[tokio::test]
    async fn test_upload_rejected_while_analyzing() {
        let (pipeline, _, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();
        session.apply(Event::FileSelected).unwrap();
        session.apply(Event::DocumentRead).unwrap();

        let err = session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
        assert!(session.reset().is_err());
        assert!(session.is_busy());
    }

    #[tokio::test]
    async fn test_open_advisor_is_idempotent() {
        let (pipeline, _, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();

        let first = session.open_advisor(pipeline.advisor_engine.clone()).unwrap();
        first.lock().await.send("hello").await.unwrap();
        let second = session.open_advisor(pipeline.advisor_engine.clone()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_reanalysis_gets_fresh_conversation() {
        let (pipeline, _, _) = pipeline(vec![Ok(sample_json()), Ok(sample_json())]);
        let session = ScanSession::new();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        session
            .chat(pipeline.advisor_engine.clone(), "hi")
            .await
            .unwrap();
        let old = session.open_advisor(pipeline.advisor_engine.clone()).unwrap();

        session.reset().unwrap();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();
        let new = session.open_advisor(pipeline.advisor_engine.clone()).unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.lock().await.turns().len(), 1);
        assert_ne!(old.lock().await.analysis_id(), new.lock().await.analysis_id());
    }

    #[tokio::test]
    async fn test_chat_requires_complete_analysis() {
        let (pipeline, _, _) = pipeline(vec![]);
        let session = ScanSession::new();
        let err = session
            .chat(pipeline.advisor_engine.clone(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotComplete(Phase::Idle)));
    }

    #[tokio::test]
    async fn test_snapshot_json_for_complete_session() {
        let (pipeline, _, _) = pipeline(vec![Ok(sample_json())]);
        let session = ScanSession::new();
        session
            .submit(&pipeline, async { two_page_pdf() })
            .await
            .unwrap();

        let value = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(value["phase"], json!("complete"));
        assert_eq!(value["scoreBand"], json!("yellow"));
        assert_eq!(value["result"]["overallScore"], json!(72.0));
    }
}
