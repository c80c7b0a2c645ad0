use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_assemblyai_url() -> String {
    "https://api.assemblyai.com".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_max_poll_attempts() -> u32 {
    100
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_murf_url() -> String {
    "https://api.murf.ai".to_string()
}

fn default_voice() -> String {
    "en-US-natalie".to_string()
}

fn default_audio_format() -> String {
    "MP3".to_string()
}

fn default_sample_rate() -> u32 {
    24000
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Speech-to-text provider settings (AssemblyAI).
#[derive(Clone, Serialize, Deserialize)]
pub struct AssemblyAiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_assemblyai_url")]
    pub base_url: String,
    /// Delay between transcript status checks. Default: 3000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Status checks before giving up with a timeout. Default: 100 (5 minutes at 3s).
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Language-model provider settings (Google Gemini).
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Text-to-speech provider settings (Murf).
#[derive(Clone, Serialize, Deserialize)]
pub struct MurfConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_murf_url")]
    pub base_url: String,
    /// Voice used when a request does not name one.
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default = "default_audio_format")]
    pub format: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AssemblyAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_assemblyai_url(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_url(),
            model: default_gemini_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for MurfConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_murf_url(),
            default_voice: default_voice(),
            format: default_audio_format(),
            sample_rate: default_sample_rate(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AssemblyAiConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl GeminiConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl MurfConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "<unset>"
    } else {
        "[REDACTED]"
    }
}

impl fmt::Debug for AssemblyAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for MurfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MurfConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_voice", &self.default_voice)
            .field("format", &self.format)
            .field("sample_rate", &self.sample_rate)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
