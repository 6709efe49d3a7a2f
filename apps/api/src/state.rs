use crate::config::Config;
use crate::lifecycle::{Pipeline, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Ingestor, scoring client and conversational engine shared by every session.
    pub pipeline: Pipeline,
}
