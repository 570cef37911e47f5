use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::epg::timeshift::TimeOffset;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// EPG sources, in any order; priority decides precedence
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Path of the merged XMLTV file
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Also write a gzip-compressed copy next to the output file
    #[serde(default = "default_true")]
    pub compress_output: bool,

    /// Value of the `generator-info-name` attribute on the output root
    #[serde(default = "default_generator_name")]
    pub generator_name: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Channel id aliases: source id -> id used in the merged guide
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,

    /// Channel selection rules
    #[serde(default)]
    pub filters: ChannelFilters,

    /// User channel list merged into `filters`; `null` disables it.
    /// A relative path is resolved next to the config file.
    #[serde(default = "default_channels_file")]
    pub channels_file: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One configured EPG source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// Human-readable name, used in logs and reports
    pub name: String,

    /// `http(s)://` URL, `file://` URL or local path
    pub url: String,

    /// Lower value wins conflicts
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Inactive sources are neither fetched nor merged
    #[serde(default = "default_true")]
    pub active: bool,

    /// Signed `+HHMM`/`-HHMM` shift applied to programme times
    #[serde(default, alias = "offset", skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<String>,

    /// Fetch timeout in seconds
    #[serde(default = "default_source_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Create an active source with default priority and timeout
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            priority: default_priority(),
            active: true,
            time_offset: None,
            timeout_secs: default_source_timeout_secs(),
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the time offset
    pub fn with_offset(mut self, offset: impl Into<String>) -> Self {
        self.time_offset = Some(offset.into());
        self
    }

    /// Set whether the source is active
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the fetch timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google public translate endpoint
    #[default]
    Google,
    // @provider: Ollama (local LLM)
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Ollama => "Ollama",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Master switch; when off no provider is ever called
    #[serde(default)]
    pub enabled: bool,

    /// Target language code (ISO 639-1 or 639-2)
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Persisted translation cache
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Service URL; empty means the provider default
    #[serde(default)]
    pub endpoint: String,

    /// Model name (Ollama only); empty means the provider default
    #[serde(default)]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed request (Ollama only); 0 means one call per miss
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_lang: default_target_lang(),
            cache_file: default_cache_file(),
            provider: TranslationProvider::default(),
            endpoint: String::new(),
            model: String::new(),
            timeout_secs: default_translation_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl TranslationConfig {
    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.provider {
            TranslationProvider::Google => default_google_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }

        match self.provider {
            TranslationProvider::Google => String::new(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }
}

/// Channel selection rules shared by the config file and the user channel list
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ChannelFilters {
    /// Channels never included in the output
    #[serde(default)]
    pub skip_channels: Vec<String>,

    /// Channels whose texts are translated
    #[serde(default)]
    pub translate_channels: Vec<String>,

    /// Allow-list; when present only these channels are included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
}

impl ChannelFilters {
    /// Load a user channel list (`channels.json`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open channel list: {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse channel list: {:?}", path))
    }

    /// Fold another rule set into this one. Lists are unioned; an allow-list
    /// on either side makes the result an allow-list.
    pub fn extend(&mut self, other: ChannelFilters) {
        extend_unique(&mut self.skip_channels, other.skip_channels);
        extend_unique(&mut self.translate_channels, other.translate_channels);
        self.channels = match (self.channels.take(), other.channels) {
            (Some(mut mine), Some(theirs)) => {
                extend_unique(&mut mine, theirs);
                Some(mine)
            }
            (mine, theirs) => mine.or(theirs),
        };
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_file() -> String {
    "merged_epg.xml".to_string()
}

fn default_channels_file() -> Option<String> {
    Some("channels.json".to_string())
}

fn default_generator_name() -> String {
    "epgmerge".to_string()
}

fn default_priority() -> i32 {
    100
}

fn default_source_timeout_secs() -> u64 {
    60
}

fn default_translation_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    0
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_target_lang() -> String {
    "en".to_string()
}

fn default_cache_file() -> String {
    "translation_cache.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let mut config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if let (Some(channels_file), Some(dir)) = (&config.channels_file, path.parent()) {
            if Path::new(channels_file).is_relative() && !dir.as_os_str().is_empty() {
                config.channels_file = Some(dir.join(channels_file).to_string_lossy().into_owned());
            }
        }

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.output_file.trim().is_empty() {
            return Err(anyhow!("output_file must not be empty"));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(anyhow!("Source with url '{}' has no name", source.url));
            }
            if !names.insert(source.name.as_str()) {
                return Err(anyhow!("Duplicate source name: {}", source.name));
            }
            if source.url.trim().is_empty() {
                return Err(anyhow!("Source '{}' has no url", source.name));
            }
            if source.timeout_secs == 0 {
                return Err(anyhow!("Source '{}' has a zero timeout", source.name));
            }
            if let Some(offset) = &source.time_offset {
                if !offset.trim().is_empty() && TimeOffset::parse(offset).is_none() {
                    return Err(anyhow!(
                        "Source '{}' has an invalid time_offset '{}' (expected +HHMM or -HHMM)",
                        source.name,
                        offset
                    ));
                }
            }
        }

        if self.translation.enabled {
            crate::language_utils::validate_language_code(&self.translation.target_lang)
                .context("Invalid translation target_lang")?;
            if self.translation.cache_file.trim().is_empty() {
                return Err(anyhow!("translation.cache_file must not be empty"));
            }
        }

        Ok(())
    }

    /// Filters from the config merged with the user channel list, if any.
    /// A missing channel list is not an error.
    pub fn effective_filters(&self) -> Result<ChannelFilters> {
        let mut filters = self.filters.clone();

        if let Some(path) = &self.channels_file {
            if Path::new(path).exists() {
                filters.extend(ChannelFilters::from_file(path)?);
            } else {
                warn!("Channel list '{}' not found, using config filters only", path);
            }
        }

        Ok(filters)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            sources: Vec::new(),
            output_file: default_output_file(),
            compress_output: true,
            generator_name: default_generator_name(),
            translation: TranslationConfig::default(),
            mapping: BTreeMap::new(),
            filters: ChannelFilters::default(),
            channels_file: default_channels_file(),
            log_level: LogLevel::default(),
        }
    }
}
