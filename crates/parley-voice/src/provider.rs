//! Capability traits the pipeline is written against.

use crate::error::VoiceError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Converts recorded audio into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribes `audio`, giving up with [`VoiceError::Cancelled`] once
    /// `cancel` fires.
    ///
    /// Never returns an "in progress" value: the result is either the final
    /// transcript or a terminal error.
    async fn transcribe(
        &self,
        audio: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, VoiceError>;
}

/// Generates a reply to a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model's reply, trimmed of surrounding whitespace. An empty
    /// reply is an error.
    async fn converse(&self, prompt: &str) -> Result<String, VoiceError>;
}

/// Turns text into playable audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesizes `text` and returns a URL to the audio. `None` selects the
    /// provider's configured default voice.
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<String, VoiceError>;

    /// Returns the provider's voice catalog as-is.
    async fn voices(&self) -> Result<serde_json::Value, VoiceError>;
}
