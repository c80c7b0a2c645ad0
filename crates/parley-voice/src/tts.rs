use crate::check_status;
use crate::config::MurfConfig;
use crate::error::{Stage, VoiceError};
use crate::provider::TextToSpeech;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    format: &'a str,
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechResponse {
    #[serde(default)]
    audio_file: Option<String>,
}

/// Murf speech synthesis client.
#[derive(Debug, Clone)]
pub struct TtsService {
    config: MurfConfig,
    client: reqwest::Client,
}

impl TtsService {
    pub fn new(config: MurfConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.has_credential()
    }

    pub fn default_voice(&self) -> &str {
        &self.config.default_voice
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1/speech/{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    fn api_key(&self) -> Result<&str, VoiceError> {
        if self.config.has_credential() {
            Ok(&self.config.api_key)
        } else {
            Err(VoiceError::missing_credential(Stage::Tts, "MURF_API_KEY"))
        }
    }
}

#[async_trait]
impl TextToSpeech for TtsService {
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<String, VoiceError> {
        let api_key = self.api_key()?;

        if text.trim().is_empty() {
            return Err(VoiceError::Tts("text is empty".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let voice_id = voice_id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&self.config.default_voice);

        let response = self
            .client
            .post(self.endpoint("generate"))
            .header("api-key", api_key)
            .header("accept", "application/json")
            .timeout(self.config.request_timeout())
            .json(&SpeechRequest {
                text,
                voice_id,
                format: &self.config.format,
                sample_rate: self.config.sample_rate,
            })
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("request failed: {}", e)))?;

        let speech: SpeechResponse = check_status(response)
            .await
            .map_err(VoiceError::Tts)?
            .json()
            .await
            .map_err(|e| VoiceError::Tts(format!("invalid response: {}", e)))?;

        let audio_url = speech
            .audio_file
            .filter(|url| !url.is_empty())
            .ok_or_else(|| VoiceError::Tts("provider returned no audio".to_string()))?;

        debug!(voice_id, chars = text.len(), "synthesized speech");
        Ok(audio_url)
    }

    async fn voices(&self) -> Result<serde_json::Value, VoiceError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.endpoint("voices"))
            .header("api-key", api_key)
            .header("accept", "application/json")
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("request failed: {}", e)))?;

        check_status(response)
            .await
            .map_err(VoiceError::Tts)?
            .json()
            .await
            .map_err(|e| VoiceError::Tts(format!("invalid voice catalog: {}", e)))
    }
}
