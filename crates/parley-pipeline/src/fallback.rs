//! Substitute values used when a pipeline stage fails.

use parley_types::{ErrorKind, StructuredError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FALLBACK_TEXT: &str = "I'm having trouble connecting right now.";
pub const DEFAULT_FALLBACK_AUDIO: &str = "/static/fallback.mp3";

fn default_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

fn default_audio_url() -> String {
    DEFAULT_FALLBACK_AUDIO.to_string()
}

/// Apology text and audio substituted for a failed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Replaces the language model's reply, and is the `message` of every
    /// structured error.
    #[serde(default = "default_text")]
    pub text: String,
    /// Replaces synthesized speech.
    #[serde(default = "default_audio_url")]
    pub audio_url: String,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            text: default_text(),
            audio_url: default_audio_url(),
        }
    }
}

impl FallbackPolicy {
    /// Builds the error body for `kind`, optionally pointing the client at the
    /// fallback audio.
    pub fn error(
        &self,
        kind: ErrorKind,
        err: &dyn fmt::Display,
        with_audio: bool,
    ) -> StructuredError {
        StructuredError {
            error_kind: kind,
            message: self.text.clone(),
            details: err.to_string(),
            audio_url: with_audio.then(|| self.audio_url.clone()),
        }
    }
}
