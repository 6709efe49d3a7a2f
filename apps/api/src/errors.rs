use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::advisory::AdvisoryError;
use crate::lifecycle::machine::InvalidTransition;
use crate::lifecycle::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No analysis: {0}")]
    NoAnalysis(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::Conflict(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidTransition(e) => e.into(),
            SessionError::NotComplete(_) => AppError::NoAnalysis(err.to_string()),
            SessionError::Advisory(AdvisoryError::EmptyMessage) => {
                AppError::Validation(AdvisoryError::EmptyMessage.to_string())
            }
            SessionError::Advisory(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone()),
            AppError::NoAnalysis(msg) => (StatusCode::CONFLICT, "NO_ANALYSIS", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::machine::Phase;

    #[test]
    fn test_session_errors_map_to_status() {
        let cases = [
            (
                SessionError::InvalidTransition(InvalidTransition {
                    from: Phase::Analyzing,
                    event: "reset_requested",
                }),
                StatusCode::CONFLICT,
            ),
            (SessionError::NotComplete(Phase::Idle), StatusCode::CONFLICT),
            (
                SessionError::Advisory(AdvisoryError::EmptyMessage),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_chat_before_analysis_has_own_code() {
        let err = AppError::from(SessionError::NotComplete(Phase::Idle));
        assert!(matches!(err, AppError::NoAnalysis(_)));

        let err = AppError::from(SessionError::InvalidTransition(InvalidTransition {
            from: Phase::Complete,
            event: "file_selected",
        }));
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let response = AppError::Internal(anyhow::anyhow!("api key leaked")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
