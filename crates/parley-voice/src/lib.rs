//! Provider clients for the Parley voice pipeline.
//!
//! Wraps the three external services a voice conversation depends on:
//! speech-to-text (AssemblyAI), a language model (Gemini) and
//! text-to-speech (Murf). Each client is stateless apart from its
//! configuration and is safe to share across concurrent requests.
//!
//! The pipeline only talks to the clients through the [`SpeechToText`],
//! [`LanguageModel`] and [`TextToSpeech`] traits, so tests and alternative
//! vendors can substitute their own implementations.
//!
//! A client whose credential is missing still constructs; every call on it
//! fails with [`VoiceError::Config`] so the caller can fall back instead of
//! the process refusing to start.

pub mod config;
pub mod error;
pub mod llm;
pub mod provider;
pub mod stt;
pub mod tts;

pub use config::{AssemblyAiConfig, GeminiConfig, MurfConfig};
pub use error::{Stage, VoiceError};
pub use llm::LlmService;
pub use provider::{LanguageModel, SpeechToText, TextToSpeech};
pub use stt::{SttService, MAX_STT_INPUT_BYTES};
pub use tts::TtsService;

/// Returns the response untouched when its status is a success, otherwise a
/// message carrying the status and the provider's error body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("provider returned {}: {}", status, body.trim()))
}
