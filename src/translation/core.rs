/*!
 * Translator for guide texts.
 *
 * Translation is opt-in per channel: only texts belonging to channels on the
 * translate-list are sent out, and every successful result is memoized in the
 * `TranslationCache`. Failures never propagate to the merge; the original
 * text is returned and nothing is cached, so a later run can retry.
 */

use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;

use crate::app_config::{ChannelFilters, TranslationConfig};
use crate::errors::TranslationError;
use crate::providers::{self, TranslationBackend};
use crate::translation::cache::TranslationCache;

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Texts answered from the cache
    pub cache_hits: usize,
    /// Calls that reached the provider
    pub provider_calls: usize,
    /// Provider calls that failed
    pub failures: usize,
}

/// Translates channel names, titles and descriptions through a cached backend
#[derive(Debug)]
pub struct Translator {
    /// Global switch
    enabled: bool,
    /// Target language code
    target_language: String,
    /// Channels whose texts are translated
    translate_ids: HashSet<String>,
    /// Memo of earlier translations
    cache: TranslationCache,
    /// External translation capability; absent when disabled
    backend: Option<Box<dyn TranslationBackend>>,
    /// Run counters
    stats: TranslationStats,
}

impl Translator {
    /// A translator that always returns its input
    pub fn disabled() -> Self {
        Self::disabled_with_cache(TranslationCache::new())
    }

    /// A disabled translator that still carries a cache, so it is persisted unchanged
    pub fn disabled_with_cache(cache: TranslationCache) -> Self {
        Self {
            enabled: false,
            target_language: String::new(),
            translate_ids: HashSet::new(),
            cache,
            backend: None,
            stats: TranslationStats::default(),
        }
    }

    /// An enabled translator around an explicit backend and cache
    pub fn new<I, S>(
        backend: Box<dyn TranslationBackend>,
        target_language: impl Into<String>,
        translate_ids: I,
        cache: TranslationCache,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            target_language: target_language.into(),
            translate_ids: translate_ids.into_iter().map(Into::into).collect(),
            cache,
            backend: Some(backend),
            stats: TranslationStats::default(),
        }
    }

    /// Build from configuration, loading the persisted cache
    pub fn from_config(config: &TranslationConfig, filters: &ChannelFilters) -> Result<Self> {
        let cache = TranslationCache::load(&config.cache_file);

        if !config.enabled {
            return Ok(Self::disabled_with_cache(cache));
        }

        let backend = providers::create_backend(config)?;
        info!(
            "Translating {} channel(s) into '{}' with {} ({} cached entries)",
            filters.translate_channels.len(),
            config.target_lang,
            config.provider.display_name(),
            cache.len()
        );

        Ok(Self::new(
            backend,
            config.target_lang.clone(),
            filters.translate_channels.iter().cloned(),
            cache,
        ))
    }

    /// Whether translation is globally enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether texts of this channel are eligible for translation
    pub fn wants(&self, channel_id: &str) -> bool {
        self.enabled && self.translate_ids.contains(channel_id)
    }

    /// Translate `text` belonging to `channel_id`, falling back to `text` on any failure
    pub async fn translate(&mut self, text: &str, channel_id: &str) -> String {
        if !self.wants(channel_id) || text.trim().is_empty() {
            return text.to_string();
        }

        match self.try_translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                self.stats.failures += 1;
                warn!("Translation failed for channel {}: {}", channel_id, e);
                text.to_string()
            }
        }
    }

    /// Cache lookup, then a single provider call; caches only successful results
    pub async fn try_translate(&mut self, text: &str) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(text) {
            self.stats.cache_hits += 1;
            return Ok(cached);
        }

        let Some(backend) = self.backend.as_ref() else {
            return Ok(text.to_string());
        };

        self.stats.provider_calls += 1;
        let translated = backend.translate(text, &self.target_language).await?;

        if translated.trim().is_empty() {
            return Err(TranslationError::EmptyResult(text.to_string()));
        }

        debug!("Translated with {}: '{}'", backend.name(), translated);
        self.cache.store(text, &translated);
        Ok(translated)
    }

    /// Persist the cache to its file
    pub fn save_cache(&self) -> Result<()> {
        self.cache.save()
    }

    /// The underlying cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Run counters
    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::disabled()
    }
}
