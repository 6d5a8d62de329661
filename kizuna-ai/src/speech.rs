//! Speech-synthesis client — OpenAI-compatible text-to-speech.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use kizuna_core::collab::{CollabError, SpeechSynthesizer};
use kizuna_core::config::SpeechConfig;

use crate::error::AiError;

/// Client for an OpenAI-compatible `/v1/audio/speech` endpoint.
pub struct SpeechClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
    timeout_ms: u64,
}

impl SpeechClient {
    /// Build a client from the engine's speech config section.
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            timeout_ms: config.request_timeout_ms,
        }
    }

    /// Synthesize `text` into audio bytes.
    ///
    /// # Errors
    /// Any transport or HTTP failure maps to an [`AiError`].
    pub async fn speech(&self, text: &str) -> Result<Vec<u8>, AiError> {
        let url = format!("{}/v1/audio/speech", self.base_url);
        let body = json!({
            "model": self.model,
            "voice": self.voice,
            "input": text,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!(%status, "speech synthesis returned error");
            return Err(AiError::RequestFailed(format!("HTTP {status}")));
        }

        let bytes = resp.bytes().await?;
        debug!(audio_bytes = bytes.len(), "speech synthesized");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CollabError> {
        self.speech(text).await.map_err(CollabError::from)
    }
}
