#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use parley_pipeline::{FallbackPolicy, Orchestrator};
use parley_server::AppState;
use parley_voice::{LanguageModel, SpeechToText, TextToSpeech, VoiceError};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const BOUNDARY: &str = "parley-test-boundary";

/// Transcribes uploaded bytes as their UTF-8 text, or always fails.
pub struct FakeStt {
    pub fail: bool,
}

#[async_trait]
impl SpeechToText for FakeStt {
    async fn transcribe(
        &self,
        audio: &[u8],
        _cancel: &CancellationToken,
    ) -> Result<String, VoiceError> {
        if self.fail {
            return Err(VoiceError::Transcription("audio unintelligible".to_string()));
        }
        Ok(String::from_utf8_lossy(audio).into_owned())
    }
}

/// Replies with `"echo: <last prompt line>"`.
pub struct FakeLlm;

#[async_trait]
impl LanguageModel for FakeLlm {
    async fn converse(&self, prompt: &str) -> Result<String, VoiceError> {
        Ok(format!("echo: {}", prompt.lines().last().unwrap_or_default()))
    }
}

pub struct FakeTts;

#[async_trait]
impl TextToSpeech for FakeTts {
    async fn synthesize(&self, _text: &str, voice_id: Option<&str>) -> Result<String, VoiceError> {
        Ok(format!(
            "https://audio.test/{}.mp3",
            voice_id.unwrap_or("en-US-natalie")
        ))
    }

    async fn voices(&self) -> Result<Value, VoiceError> {
        Ok(json!([
            { "voiceId": "en-US-natalie", "displayName": "Natalie (F)" },
            { "voiceId": "en-US-terrell", "displayName": "Terrell (M)" }
        ]))
    }
}

pub fn state_with(
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn LanguageModel>,
    tts: Arc<dyn TextToSpeech>,
    dir: &Path,
) -> AppState {
    let orchestrator = Orchestrator::new(stt, llm, tts, FallbackPolicy::default());
    AppState {
        orchestrator: Arc::new(orchestrator),
        upload_dir: dir.join("uploads"),
        static_dir: dir.join("static"),
    }
}

/// State whose providers all succeed.
pub fn working_state(dir: &Path) -> AppState {
    state_with(
        Arc::new(FakeStt { fail: false }),
        Arc::new(FakeLlm),
        Arc::new(FakeTts),
        dir,
    )
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Audio file part named the way the browser client sends it.
pub fn audio(data: &[u8]) -> Part<'_> {
    Part::File {
        name: "audio_file",
        filename: "recording.webm",
        content_type: "audio/webm",
        data,
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
