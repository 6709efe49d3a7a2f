use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::ingest::IngestError;
use crate::analysis::UploadedFile;
use crate::errors::AppError;
use crate::lifecycle::machine::Snapshot;
use crate::lifecycle::{ChatExchange, ScanSession};
use crate::models::conversation::ConversationTurn;
use crate::routes::upload_body_limit;
use crate::state::AppState;
use std::sync::Arc;

/// Multipart field carrying the résumé.
const FILE_FIELD: &str = "file";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub turns: Vec<ConversationTurn>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(respond(&session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, id).await?;
    Ok(Json(respond(&session)))
}

/// POST /api/v1/sessions/:id/upload
///
/// Responds 200 with the resulting snapshot whether the analysis completed or
/// failed; a failed analysis is a state of the session, not of the request.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, id).await?;

    let limit = upload_body_limit(state.config.max_upload_bytes);
    if let Some(length) = content_length(&headers) {
        if length > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "request body is {length} bytes, limit is {limit} bytes"
            )));
        }
    }

    session
        .submit(&state.pipeline, read_upload(multipart))
        .await?;
    Ok(Json(respond(&session)))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, id).await?;
    session.reset()?;
    Ok(Json(respond(&session)))
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_get_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let session = find(&state, id).await?;
    let turns = session
        .transcript(state.pipeline.advisor_engine.clone())
        .await?;
    Ok(Json(TranscriptResponse { turns }))
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_send_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatExchange>, AppError> {
    let session = find(&state, id).await?;
    let exchange = session
        .chat(state.pipeline.advisor_engine.clone(), &req.text)
        .await?;
    Ok(Json(exchange))
}

async fn find(state: &AppState, id: Uuid) -> Result<Arc<ScanSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

fn respond(session: &ScanSession) -> SessionResponse {
    SessionResponse {
        session_id: session.id(),
        snapshot: session.snapshot(),
    }
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Reads the `file` part of the upload. Other parts are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, IngestError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::Interrupted(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| IngestError::Interrupted(e.body_text()))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(IngestError::Missing)
}
