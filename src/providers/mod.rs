/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Google: public translate endpoint (no API key)
 * - Ollama: Local LLM server
 * - Mock: scripted behavior for tests and benchmarks
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translator.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate a single text into the target language
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `target_language` - ISO 639 code of the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Build the backend selected in the configuration
pub fn create_backend(config: &TranslationConfig) -> Result<Box<dyn TranslationBackend>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let backend: Box<dyn TranslationBackend> = match config.provider {
        TranslationProvider::Google => Box::new(google::GoogleTranslate::new(
            config.get_endpoint(),
            timeout,
        )),
        TranslationProvider::Ollama => Box::new(ollama::Ollama::new(
            config.get_endpoint(),
            config.get_model(),
            timeout,
            config.retry_count,
            config.retry_backoff_ms,
        )),
    };

    Ok(backend)
}

pub mod google;
pub mod ollama;
pub mod mock;
