//! Parley server library logic.

pub mod api;
pub mod api_upload;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use parley_pipeline::Orchestrator;
use parley_voice::{LlmService, SttService, TtsService, MAX_STT_INPUT_BYTES};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline orchestrator owning the provider clients and session history.
    pub orchestrator: Arc<Orchestrator>,
    /// Directory `/upload-audio` writes to.
    pub upload_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Builds the provider clients and orchestrator described by `config`.
    ///
    /// A missing credential is logged and leaves that provider permanently
    /// failing, so the affected stage falls back instead of the server
    /// refusing to start.
    pub fn from_config(config: &Config, shutdown: CancellationToken) -> Self {
        let providers = &config.providers;
        let stt = Arc::new(SttService::new(providers.assemblyai.clone()));
        let llm = Arc::new(LlmService::new(providers.gemini.clone()));
        let tts = Arc::new(TtsService::new(providers.murf.clone()));

        if !stt.is_enabled() {
            tracing::warn!("ASSEMBLYAI_API_KEY not set, transcription requests will fail");
        }
        if !llm.is_enabled() {
            tracing::warn!("GEMINI_API_KEY not set, replies will use the fallback text");
        }
        if !tts.is_enabled() {
            tracing::warn!("MURF_API_KEY not set, speech will use the fallback audio");
        }

        tracing::info!(
            model = llm.model(),
            voice = tts.default_voice(),
            "provider clients initialized"
        );

        let orchestrator =
            Orchestrator::new(stt, llm, tts, config.fallback.clone()).with_shutdown(shutdown);

        Self {
            orchestrator: Arc::new(orchestrator),
            upload_dir: config.storage.upload_dir.clone(),
            static_dir: config.storage.static_dir.clone(),
        }
    }
}

/// Maximum request body size: the largest accepted audio file plus room for
/// the multipart framing and text fields.
const MAX_REQUEST_BODY_BYTES: usize = MAX_STT_INPUT_BYTES + 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let upload_dir = state.upload_dir.clone();
    let static_dir = state.static_dir.clone();
    tracing::info!(path = %upload_dir.display(), "serving uploaded files at /uploads");
    tracing::info!(path = %static_dir.display(), "serving static assets at /static");

    Router::new()
        .route("/", get(api::index_handler))
        .route("/health", get(health))
        .route("/tts", post(api::tts_handler))
        .route("/voices", get(api::voices_handler))
        .route("/upload-audio", post(api_upload::upload_audio_handler))
        .route("/transcribe", post(api::transcribe_handler))
        .route("/transcribe_assemblyai", post(api::transcribe_handler))
        .route("/tts/echo", post(api::echo_handler))
        .route("/llm/query", post(api::llm_query_handler))
        .route("/agent/chat/{session_id}", post(api::agent_chat_handler))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
