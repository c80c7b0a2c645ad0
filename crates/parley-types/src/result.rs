//! Response shapes produced by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying which operation failed in a [`StructuredError`].
///
/// Serialized as `"<operation>_failure"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Speech-to-text failed; no transcription is available.
    #[serde(rename = "stt_failure")]
    Stt,
    /// Text-to-speech failed on the text-only synthesis endpoint.
    #[serde(rename = "tts_failure")]
    Tts,
    /// The voice catalog could not be fetched.
    #[serde(rename = "voices_failure")]
    Voices,
    /// An uploaded audio file could not be stored.
    #[serde(rename = "upload_audio_failure")]
    UploadAudio,
    #[serde(rename = "echo_tts_failure")]
    EchoTts,
    #[serde(rename = "llm_query_failure")]
    LlmQuery,
    #[serde(rename = "agent_chat_failure")]
    AgentChat,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stt => "stt_failure",
            Self::Tts => "tts_failure",
            Self::Voices => "voices_failure",
            Self::UploadAudio => "upload_audio_failure",
            Self::EchoTts => "echo_tts_failure",
            Self::LlmQuery => "llm_query_failure",
            Self::AgentChat => "agent_chat_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error-shaped body returned in place of a [`PipelineResult`] when a
/// request cannot produce a meaningful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredError {
    #[serde(rename = "error")]
    pub error_kind: ErrorKind,
    /// User-facing apology text.
    pub message: String,
    /// Display string of the underlying error.
    pub details: String,
    /// Fallback audio to play, when the failure has one.
    pub audio_url: Option<String>,
}

/// Success-shaped body of every pipeline endpoint.
///
/// Fields an endpoint does not produce are omitted from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}
