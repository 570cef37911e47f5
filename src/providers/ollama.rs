use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::TranslationBackend;

/// Ollama client for translating guide texts with a local LLM
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to use for generation
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// System prompt for a target language
    pub fn system_prompt(target_language: &str) -> String {
        let language = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());
        format!(
            "You are a professional translator of TV guide listings. Translate the user's text into {}. \
             Keep proper names, channel names and numbers unchanged. Reply with the translation only.",
            language
        )
    }

    /// Send a generation request, retrying transient failures with exponential backoff
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut attempt = 0;

        loop {
            match self.generate_once(&url, request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = self.backoff_base_ms * 2u64.pow(attempt);
                    warn!("Ollama request failed (attempt {}): {}. Retrying in {}ms", attempt + 1, e, delay);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_once(&self, url: &str, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let response = self.client.post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response.json::<GenerationResponse>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::ConnectionError(_) | ProviderError::RateLimitExceeded(_) => true,
        ProviderError::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
        _ => false,
    }
}

#[async_trait]
impl TranslationBackend for Ollama {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(Self::system_prompt(target_language))
            .temperature(0.2);

        let response = self.generate(&request).await?;
        let translated = response.response.trim().to_string();

        if translated.is_empty() {
            return Err(ProviderError::ParseError("empty response from Ollama".to_string()));
        }

        Ok(translated)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
