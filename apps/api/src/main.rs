mod advisory;
mod analysis;
mod config;
mod errors;
mod lifecycle;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{AnalysisClient, Ingestor};
use crate::config::Config;
use crate::lifecycle::{Pipeline, SessionStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ROscore API v{}", env!("CARGO_PKG_VERSION"));

    // One client serves both the scoring and the conversational engine
    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!(
        "LLM client initialized (scoring: {}, advisor: {})",
        llm_client::SCORING_MODEL,
        llm_client::ADVISOR_MODEL
    );

    let analysis = AnalysisClient::new(llm.clone());
    info!("Scoring rubric version {}", analysis.rubric_version());

    let pipeline = Pipeline {
        ingestor: Ingestor::new(config.max_upload_bytes),
        analysis,
        advisor_engine: llm,
    };

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
    info!(
        "Session store ready (idle TTL {} min, upload limit {} bytes)",
        config.session_ttl_minutes, config.max_upload_bytes
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        sessions,
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
