use crate::check_status;
use crate::config::GeminiConfig;
use crate::error::{Stage, VoiceError};
use crate::provider::LanguageModel;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini `generateContent` client.
///
/// Sends the whole prompt as a single user message; conversation history is
/// rendered into the prompt by the caller.
#[derive(Debug, Clone)]
pub struct LlmService {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl LlmService {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.has_credential()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LanguageModel for LlmService {
    async fn converse(&self, prompt: &str) -> Result<String, VoiceError> {
        if !self.config.has_credential() {
            return Err(VoiceError::missing_credential(Stage::Llm, "GEMINI_API_KEY"));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(self.config.request_timeout())
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Llm(format!("request failed: {}", e)))?;

        let generated: GenerateResponse = check_status(response)
            .await
            .map_err(VoiceError::Llm)?
            .json()
            .await
            .map_err(|e| VoiceError::Llm(format!("invalid response: {}", e)))?;

        let text = generated.text().trim().to_string();
        if text.is_empty() {
            return Err(VoiceError::Llm("model returned an empty response".to_string()));
        }

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            reply_chars = text.len(),
            "language model replied"
        );
        Ok(text)
    }
}
