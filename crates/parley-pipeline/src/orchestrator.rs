//! Request pipelines chaining speech-to-text, the language model and
//! text-to-speech.
//!
//! Every pipeline applies the same failure policy:
//!
//! | Stage | On failure |
//! |-------|------------|
//! | STT   | abort with a `stt_failure` [`StructuredError`] |
//! | LLM   | substitute the fallback text, continue |
//! | TTS   | substitute the fallback audio, continue |
//!
//! Only the text-only [`Orchestrator::speak`] pipeline, whose single stage
//! is TTS, reports a TTS failure as an error.

use crate::fallback::FallbackPolicy;
use crate::session::SessionStore;
use parley_types::{render_transcript, ConversationTurn, ErrorKind, PipelineResult, StructuredError};
use parley_voice::{LanguageModel, SpeechToText, TextToSpeech, VoiceError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct Orchestrator {
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn LanguageModel>,
    tts: Arc<dyn TextToSpeech>,
    sessions: Arc<SessionStore>,
    fallback: FallbackPolicy,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        llm: Arc<dyn LanguageModel>,
        tts: Arc<dyn TextToSpeech>,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            sessions: Arc::new(SessionStore::new()),
            fallback,
            shutdown: CancellationToken::new(),
        }
    }

    /// Replaces the session store, e.g. to share one with a test.
    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Sets the token whose cancellation aborts in-flight transcriptions.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn fallback(&self) -> &FallbackPolicy {
        &self.fallback
    }

    /// Text → speech. A TTS failure is returned as a `tts_failure` error
    /// carrying the fallback audio.
    pub async fn speak(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<PipelineResult, StructuredError> {
        match self.tts.synthesize(text, voice_id).await {
            Ok(audio_url) => Ok(PipelineResult {
                audio_url: Some(audio_url),
                ..Default::default()
            }),
            Err(e) => {
                warn!(error = %e, "speech synthesis failed");
                Err(self.fallback.error(ErrorKind::Tts, &e, true))
            }
        }
    }

    /// Passes the provider's voice catalog through.
    pub async fn voices(&self) -> Result<serde_json::Value, StructuredError> {
        self.tts.voices().await.map_err(|e| {
            warn!(error = %e, "failed to fetch voice catalog");
            // A missing credential still offers the apology audio; a provider
            // failure does not.
            let with_audio = matches!(e, VoiceError::Config { .. });
            self.fallback.error(ErrorKind::Voices, &e, with_audio)
        })
    }

    /// Audio → text.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<PipelineResult, StructuredError> {
        let transcription = self.run_stt(audio).await?;
        Ok(PipelineResult {
            transcription: Some(transcription),
            ..Default::default()
        })
    }

    /// Audio → text → the same text spoken back.
    pub async fn echo(
        &self,
        audio: &[u8],
        voice_id: Option<&str>,
    ) -> Result<PipelineResult, StructuredError> {
        let transcription = self.run_stt(audio).await?;
        let audio_url = self.run_tts(&transcription, voice_id).await;
        Ok(PipelineResult {
            transcription: Some(transcription),
            audio_url: Some(audio_url),
            ..Default::default()
        })
    }

    /// Audio → text → single-turn model reply → speech.
    pub async fn query(
        &self,
        audio: &[u8],
        voice_id: Option<&str>,
    ) -> Result<PipelineResult, StructuredError> {
        let transcription = self.run_stt(audio).await?;
        let reply = self.run_llm(&transcription).await;
        let audio_url = self.run_tts(&reply, voice_id).await;
        Ok(PipelineResult {
            transcription: Some(transcription),
            llm_response: Some(reply),
            audio_url: Some(audio_url),
            ..Default::default()
        })
    }

    /// Audio → text → reply conditioned on the session's history → speech.
    ///
    /// The user turn is recorded right after transcription and the assistant
    /// turn (real or fallback) right after the model resolves. The session
    /// stays locked between the two so concurrent requests on one session
    /// cannot interleave their turns.
    pub async fn chat(
        &self,
        session_id: &str,
        audio: &[u8],
        voice_id: Option<&str>,
    ) -> Result<PipelineResult, StructuredError> {
        let transcription = self.run_stt(audio).await?;

        let reply = {
            let session = self.sessions.session(session_id);
            let mut turns = session.lock().await;
            turns.push(ConversationTurn::user(transcription.clone()));
            let prompt = render_transcript(&turns);
            let reply = self.run_llm(&prompt).await;
            turns.push(ConversationTurn::assistant(reply.clone()));
            info!(session_id, turns = turns.len(), "session history updated");
            reply
        };

        let audio_url = self.run_tts(&reply, voice_id).await;
        Ok(PipelineResult {
            session_id: Some(session_id.to_string()),
            transcription: Some(transcription),
            llm_response: Some(reply),
            audio_url: Some(audio_url),
        })
    }

    async fn run_stt(&self, audio: &[u8]) -> Result<String, StructuredError> {
        match self.stt.transcribe(audio, &self.shutdown).await {
            Ok(text) => {
                info!(bytes = audio.len(), chars = text.len(), "transcription ready");
                Ok(text)
            }
            Err(e) => {
                warn!(error = %e, "transcription failed, aborting pipeline");
                Err(self.fallback.error(ErrorKind::Stt, &e, true))
            }
        }
    }

    async fn run_llm(&self, prompt: &str) -> String {
        match self.llm.converse(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "language model failed, using fallback text");
                self.fallback.text.clone()
            }
        }
    }

    async fn run_tts(&self, text: &str, voice_id: Option<&str>) -> String {
        match self.tts.synthesize(text, voice_id).await {
            Ok(audio_url) => audio_url,
            Err(e) => {
                warn!(error = %e, "speech synthesis failed, using fallback audio");
                self.fallback.audio_url.clone()
            }
        }
    }
}
