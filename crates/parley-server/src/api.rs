//! Pipeline API handlers.
//!
//! Every audio endpoint accepts a multipart form with the recording in an
//! `audio_file` field and an optional `voiceId`. `/tts` also takes a
//! urlencoded form. Stage failures come back as
//! a [`StructuredError`] body with status 200; only malformed requests are
//! rejected with a 4xx status.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, Extension, FromRequest,
        Multipart, Path, Request,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use parley_pipeline::FallbackPolicy;
use parley_types::{ErrorKind, PipelineResult, StructuredError};
use parley_voice::MAX_STT_INPUT_BYTES;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Landing page served at `/`.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Maximum accepted audio file size: 25 MiB.
pub(crate) const MAX_AUDIO_BYTES: usize = MAX_STT_INPUT_BYTES;

/// API error type mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself is unusable. Rendered as 400 `{"error": ...}`.
    #[error("invalid input: {0}")]
    BadRequest(String),
    /// A pipeline stage failed. Rendered as the structured body with status 200.
    #[error("{}: {}", .0.error_kind, .0.details)]
    Stage(StructuredError),
}

impl From<StructuredError> for ApiError {
    fn from(err: StructuredError) -> Self {
        ApiError::Stage(err)
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(serde_json::json!({
                    "error": msg
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Stage(err) => (StatusCode::OK, Json(err)).into_response(),
        }
    }
}

/// Fields collected from a pipeline request form.
#[derive(Debug, Default)]
pub(crate) struct PipelineForm {
    pub audio: Option<Bytes>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub voice_id: Option<String>,
    pub text: Option<String>,
}

impl PipelineForm {
    /// Reads every field of `multipart`.
    ///
    /// A broken multipart envelope is a bad request. A failure while
    /// streaming a field's contents is reported as `kind`.
    pub(crate) async fn read(
        mut multipart: Multipart,
        kind: ErrorKind,
        fallback: &FallbackPolicy,
    ) -> Result<Self, ApiError> {
        let with_audio = kind != ErrorKind::UploadAudio;
        let stream_error =
            |e: axum::extract::multipart::MultipartError| fallback.error(kind, &e, with_audio);

        let mut form = PipelineForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("audio_file") => {
                    form.file_name = field.file_name().map(str::to_owned);
                    form.content_type = field.content_type().map(str::to_owned);
                    form.audio = Some(field.bytes().await.map_err(stream_error)?);
                }
                Some("voiceId") => {
                    let voice = field.text().await.map_err(stream_error)?;
                    form.voice_id = Some(voice).filter(|v| !v.trim().is_empty());
                }
                Some("text") => {
                    form.text = Some(field.text().await.map_err(stream_error)?);
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// Takes the audio payload, rejecting a missing or oversized file.
    pub(crate) fn take_audio(&mut self) -> Result<Bytes, ApiError> {
        let audio = self
            .audio
            .take()
            .ok_or_else(|| ApiError::BadRequest("missing audio_file field".to_string()))?;
        if audio.len() > MAX_AUDIO_BYTES {
            return Err(ApiError::BadRequest(format!(
                "file too large: {} bytes (max {})",
                audio.len(),
                MAX_AUDIO_BYTES
            )));
        }
        Ok(audio)
    }
}

/// Handler for `GET /`.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Urlencoded body accepted by `POST /tts`.
#[derive(Debug, Deserialize)]
pub struct TtsForm {
    pub text: Option<String>,
    #[serde(rename = "voiceId")]
    pub voice_id: Option<String>,
}

/// Handler for `POST /tts`.
///
/// Synthesizes the `text` field of a multipart or urlencoded form. Unlike
/// the audio pipelines, a synthesis failure is reported as `tts_failure`
/// rather than papered over.
pub async fn tts_handler(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Result<Json<PipelineResult>, ApiError> {
    let orchestrator = &state.orchestrator;

    let urlencoded = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let (text, voice_id) = if urlencoded {
        let Form(form) = Form::<TtsForm>::from_request(request, &()).await?;
        (form.text, form.voice_id)
    } else {
        let multipart = Multipart::from_request(request, &()).await?;
        let form = PipelineForm::read(multipart, ErrorKind::Tts, orchestrator.fallback()).await?;
        (form.text, form.voice_id)
    };

    let text = text.ok_or_else(|| ApiError::BadRequest("missing text field".to_string()))?;
    let voice_id = voice_id.filter(|v| !v.trim().is_empty());

    let result = orchestrator.speak(&text, voice_id.as_deref()).await?;
    Ok(Json(result))
}

/// Handler for `GET /voices`.
pub async fn voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let catalog = state.orchestrator.voices().await?;
    Ok(Json(catalog))
}

/// Handler for `POST /transcribe` and `POST /transcribe_assemblyai`.
pub async fn transcribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineResult>, ApiError> {
    let orchestrator = &state.orchestrator;
    let multipart = multipart?;
    let mut form = PipelineForm::read(multipart, ErrorKind::Stt, orchestrator.fallback()).await?;
    let audio = form.take_audio()?;

    let result = orchestrator.transcribe(&audio).await?;
    Ok(Json(result))
}

/// Handler for `POST /tts/echo`.
pub async fn echo_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineResult>, ApiError> {
    let orchestrator = &state.orchestrator;
    let multipart = multipart?;
    let mut form =
        PipelineForm::read(multipart, ErrorKind::EchoTts, orchestrator.fallback()).await?;
    let audio = form.take_audio()?;

    let result = orchestrator.echo(&audio, form.voice_id.as_deref()).await?;
    Ok(Json(result))
}

/// Handler for `POST /llm/query`.
pub async fn llm_query_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineResult>, ApiError> {
    let orchestrator = &state.orchestrator;
    let multipart = multipart?;
    let mut form =
        PipelineForm::read(multipart, ErrorKind::LlmQuery, orchestrator.fallback()).await?;
    let audio = form.take_audio()?;

    let result = orchestrator.query(&audio, form.voice_id.as_deref()).await?;
    Ok(Json(result))
}

/// Handler for `POST /agent/chat/{session_id}`.
///
/// Continues the conversation identified by `session_id`, creating it on
/// first use.
pub async fn agent_chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineResult>, ApiError> {
    let orchestrator = &state.orchestrator;
    let multipart = multipart?;
    let mut form =
        PipelineForm::read(multipart, ErrorKind::AgentChat, orchestrator.fallback()).await?;
    let audio = form.take_audio()?;

    tracing::info!(session_id = %session_id, bytes = audio.len(), "agent chat turn");
    let result = orchestrator
        .chat(&session_id, &audio, form.voice_id.as_deref())
        .await?;
    Ok(Json(result))
}
