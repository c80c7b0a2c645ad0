use thiserror::Error;

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Stt,
    Llm,
    Tts,
}

#[derive(Error, Debug)]
pub enum VoiceError {
    /// A provider credential is missing or a setting is unusable.
    #[error("Invalid configuration: {reason}")]
    Config { stage: Stage, reason: String },

    #[error("STT upload error: {0}")]
    Upload(String),

    #[error("STT submission error: {0}")]
    Submission(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Transcription timed out after {attempts} status checks")]
    TranscriptionTimeout { attempts: u32 },

    #[error("Transcription cancelled")]
    Cancelled,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("TTS error: {0}")]
    Tts(String),
}

impl VoiceError {
    /// Returns the stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config { stage, .. } => *stage,
            Self::Upload(_)
            | Self::Submission(_)
            | Self::Transcription(_)
            | Self::TranscriptionTimeout { .. }
            | Self::Cancelled => Stage::Stt,
            Self::Llm(_) => Stage::Llm,
            Self::Tts(_) => Stage::Tts,
        }
    }

    pub(crate) fn missing_credential(stage: Stage, variable: &str) -> Self {
        Self::Config {
            stage,
            reason: format!("API key not configured (set {})", variable),
        }
    }
}
