use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::TranslationBackend;

/// Client for Google's public translate endpoint
///
/// The endpoint answers `GET /translate_a/single?client=gtx&sl=auto&tl=..&dt=t&q=..`
/// with a nested JSON array whose first element lists translated segments.
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://translate.googleapis.com`
    endpoint: String,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    /// Build the request URL for a text
    pub fn request_url(&self, text: &str, target_language: &str) -> Result<Url, ProviderError> {
        let base = format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))
    }

    /// Join the translated segments of a response body
    pub fn extract_text_from_response(body: &Value) -> Result<String, ProviderError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("missing segment list".to_string()))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("no translated segments".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let target = language_utils::normalize_to_part1_or_part2t(target_language)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let url = self.request_url(text, &target)?;

        let response = self.client.get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let message = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google translate error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.json::<Value>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::extract_text_from_response(&body)
    }

    fn name(&self) -> &str {
        "google"
    }
}
