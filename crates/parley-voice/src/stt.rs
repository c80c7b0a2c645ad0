use crate::check_status;
use crate::config::AssemblyAiConfig;
use crate::error::{Stage, VoiceError};
use crate::provider::SpeechToText;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Maximum audio input size for STT (25 MiB). Prevents OOM from oversized payloads.
pub const MAX_STT_INPUT_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// AssemblyAI client following the vendor's asynchronous job model:
/// upload the audio, submit a transcript job, poll the job until it settles.
#[derive(Debug, Clone)]
pub struct SttService {
    config: AssemblyAiConfig,
    client: reqwest::Client,
}

impl SttService {
    pub fn new(config: AssemblyAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.has_credential()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v2/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str, VoiceError> {
        if self.config.has_credential() {
            Ok(&self.config.api_key)
        } else {
            Err(VoiceError::missing_credential(Stage::Stt, "ASSEMBLYAI_API_KEY"))
        }
    }

    /// Uploads raw audio and returns the provider-hosted reference to it.
    pub async fn upload(&self, audio: &[u8]) -> Result<String, VoiceError> {
        let api_key = self.api_key()?;

        if audio.is_empty() {
            return Err(VoiceError::Upload("audio data is empty".to_string()));
        }
        if audio.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Upload(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        let response = self
            .client
            .post(self.endpoint("upload"))
            .header("authorization", api_key)
            .timeout(self.config.request_timeout())
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| VoiceError::Upload(format!("request failed: {}", e)))?;

        let upload: UploadResponse = check_status(response)
            .await
            .map_err(VoiceError::Upload)?
            .json()
            .await
            .map_err(|e| VoiceError::Upload(format!("invalid upload response: {}", e)))?;

        debug!(bytes = audio.len(), "uploaded audio for transcription");
        Ok(upload.upload_url)
    }

    /// Submits a transcript job for previously uploaded audio and returns its id.
    pub async fn submit_job(&self, upload_url: &str) -> Result<String, VoiceError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint("transcript"))
            .header("authorization", api_key)
            .timeout(self.config.request_timeout())
            .json(&TranscriptRequest {
                audio_url: upload_url,
            })
            .send()
            .await
            .map_err(|e| VoiceError::Submission(format!("request failed: {}", e)))?;

        let job: TranscriptJob = check_status(response)
            .await
            .map_err(VoiceError::Submission)?
            .json()
            .await
            .map_err(|e| VoiceError::Submission(format!("invalid job response: {}", e)))?;

        info!(job_id = %job.id, status = %job.status, "submitted transcription job");
        Ok(job.id)
    }

    /// Polls a transcript job until it completes, errors, runs out of attempts
    /// or `cancel` fires.
    pub async fn poll_result(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, VoiceError> {
        let max_attempts = self.config.max_poll_attempts.max(1);
        let interval = self.config.poll_interval();

        for attempt in 1..=max_attempts {
            let job = until_cancelled(cancel, self.fetch_job(job_id)).await??;

            match job.status.as_str() {
                "completed" => {
                    info!(job_id, attempt, "transcription completed");
                    return Ok(job.text.unwrap_or_default());
                }
                "error" => {
                    return Err(VoiceError::Transcription(
                        job.error.unwrap_or_else(|| "Unknown error".to_string()),
                    ));
                }
                status => debug!(job_id, status, attempt, "transcription not ready"),
            }

            if attempt < max_attempts {
                until_cancelled(cancel, tokio::time::sleep(interval)).await?;
            }
        }

        Err(VoiceError::TranscriptionTimeout {
            attempts: max_attempts,
        })
    }

    async fn fetch_job(&self, job_id: &str) -> Result<TranscriptJob, VoiceError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.endpoint(&format!("transcript/{}", job_id)))
            .header("authorization", api_key)
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| VoiceError::Transcription(format!("status request failed: {}", e)))?;

        check_status(response)
            .await
            .map_err(VoiceError::Transcription)?
            .json()
            .await
            .map_err(|e| VoiceError::Transcription(format!("invalid status response: {}", e)))
    }
}

/// Runs `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, VoiceError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(VoiceError::Cancelled),
        output = fut => Ok(output),
    }
}

#[async_trait]
impl SpeechToText for SttService {
    async fn transcribe(
        &self,
        audio: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, VoiceError> {
        let upload_url = until_cancelled(cancel, self.upload(audio)).await??;
        let job_id = until_cancelled(cancel, self.submit_job(&upload_url)).await??;
        self.poll_result(&job_id, cancel).await
    }
}
