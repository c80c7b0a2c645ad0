//! Upload API handler for raw audio recordings.
//!
//! Stores the file under the configured upload directory so it can be
//! fetched back from `/uploads`.

use crate::api::{ApiError, PipelineForm};
use crate::AppState;
use axum::extract::{multipart::MultipartRejection, Extension, Multipart};
use axum::Json;
use parley_types::ErrorKind;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Metadata returned for a stored recording.
#[derive(Debug, Serialize)]
pub struct UploadedAudio {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: usize,
    pub file_url: String,
}

/// Reduces a client-supplied file name to its final path component.
///
/// Returns `None` when nothing usable remains (empty, `.` or `..`).
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match name {
        "" | "." | ".." => None,
        _ => Some(name.to_string()),
    }
}

/// Name used when the client sent no usable file name.
fn generated_filename() -> String {
    format!("recording_{}.webm", Uuid::new_v4())
}

/// Handler for `POST /upload-audio`.
///
/// Write failures are reported as `upload_audio_failure` without fallback
/// audio.
pub async fn upload_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedAudio>, ApiError> {
    let multipart = multipart?;
    let fallback = state.orchestrator.fallback();
    let mut form = PipelineForm::read(multipart, ErrorKind::UploadAudio, fallback).await?;
    let data = form.take_audio()?;

    let filename = form
        .file_name
        .as_deref()
        .and_then(sanitize_filename)
        .unwrap_or_else(generated_filename);

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| fallback.error(ErrorKind::UploadAudio, &e, false))?;

    let file_path = state.upload_dir.join(&filename);
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| fallback.error(ErrorKind::UploadAudio, &e, false))?;

    tracing::info!(
        filename = %filename,
        size = data.len(),
        "stored uploaded recording"
    );

    Ok(Json(UploadedAudio {
        file_url: format!("/uploads/{}", filename),
        filename,
        content_type: form.content_type,
        size: data.len(),
    }))
}
