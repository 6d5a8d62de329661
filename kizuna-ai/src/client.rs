//! Text-generation client — unified interface for OpenAI-compatible and
//! Ollama backends.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use kizuna_core::collab::{CollabError, GenerationContext, TextGenerator};
use kizuna_core::config::LlmConfig;

use crate::error::AiError;
use crate::prompt;

/// Provider backend for text generation.
#[derive(Debug, Clone)]
pub enum TextProvider {
    /// OpenAI-compatible chat-completions API (also works with
    /// compatible gateways).
    OpenAiCompatible {
        /// API base URL.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// Ollama running locally.
    Ollama {
        /// API base URL.
        base_url: String,
    },
    /// No backend — every call fails, letting the caller degrade.
    None,
}

/// The text-generation client.
pub struct TextClient {
    provider: TextProvider,
    http: Client,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_ms: u64,
    max_retries: u32,
}

impl TextClient {
    /// Create a client for a provider and model.
    #[must_use]
    pub fn new(provider: TextProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 400,
            timeout_ms: 10_000,
            max_retries: 2,
        }
    }

    /// Build a client from the engine's LLM config section.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = match config.provider.as_str() {
            "ollama" => TextProvider::Ollama {
                base_url: config.base_url.clone(),
            },
            "none" => TextProvider::None,
            _ => TextProvider::OpenAiCompatible {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            },
        };
        Self {
            provider,
            http: Client::new(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_ms: config.request_timeout_ms,
            max_retries: config.max_retries,
        }
    }

    /// Create a client with no backend (all calls fail).
    #[must_use]
    pub fn none() -> Self {
        Self::new(TextProvider::None, "")
    }

    /// Whether a backend is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, TextProvider::None)
    }

    /// Generate a completion for a system/user prompt pair.
    ///
    /// # Errors
    /// `AiError::Unavailable` with no backend; `RetriesExhausted` after
    /// the configured attempts fail.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AiError> {
        match &self.provider {
            TextProvider::None => Err(AiError::Unavailable(
                "no text-generation backend configured".into(),
            )),
            TextProvider::Ollama { base_url } => self.complete_ollama(base_url, system, user).await,
            TextProvider::OpenAiCompatible { base_url, api_key } => {
                self.complete_openai(base_url, api_key, system, user).await
            }
        }
    }

    async fn complete_ollama(
        &self,
        base_url: &str,
        system: &str,
        user: &str,
    ) -> Result<String, AiError> {
        let url = format!("{base_url}/api/generate");
        let body = json!({
            "model": self.model,
            "prompt": format!("{system}\n\n{user}"),
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            }
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "retrying ollama call");
            }

            let start = Instant::now();
            let result = self
                .http
                .post(&url)
                .json(&body)
                .timeout(Duration::from_millis(self.timeout_ms))
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: serde_json::Value =
                        resp.json().await.map_err(|e| AiError::ParseError(e.to_string()))?;
                    let text = json["response"].as_str().unwrap_or("").to_string();
                    debug!(latency_ms = start.elapsed().as_millis() as u64, "ollama reply");
                    return Ok(text);
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!("ollama returned error: {last_error}");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!("ollama request failed: {last_error}");
                }
            }
        }

        Err(AiError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    async fn complete_openai(
        &self,
        base_url: &str,
        api_key: &str,
        system: &str,
        user: &str,
    ) -> Result<String, AiError> {
        let url = format!("{base_url}/v1/chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "retrying chat-completions call");
            }

            let start = Instant::now();
            let result = self
                .http
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .json(&body)
                .timeout(Duration::from_millis(self.timeout_ms))
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: serde_json::Value =
                        resp.json().await.map_err(|e| AiError::ParseError(e.to_string()))?;
                    let text = json["choices"][0]["message"]["content"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();
                    debug!(
                        latency_ms = start.elapsed().as_millis() as u64,
                        "chat-completions reply"
                    );
                    return Ok(text);
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!("chat-completions returned error: {last_error}");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!("chat-completions request failed: {last_error}");
                }
            }
        }

        Err(AiError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

#[async_trait]
impl TextGenerator for TextClient {
    async fn generate(&self, context: &GenerationContext) -> Result<String, CollabError> {
        let (system, user) = prompt::build_chat_prompt(context);
        self.complete(&system, &user).await.map_err(CollabError::from)
    }
}
