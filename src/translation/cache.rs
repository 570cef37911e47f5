/*!
 * Translation caching functionality.
 *
 * This module provides a persistent memo of already-translated strings so
 * that identical titles and descriptions are sent to the provider only once,
 * within a run and across runs. The cache is loaded once at the start of a run
 * and written back in full at the end. Entries are append-only: a stored key
 * is never overwritten.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Translation cache for storing and retrieving translations
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    /// Original text -> translated text
    entries: BTreeMap<String, String>,

    /// File the cache is persisted to, if any
    path: Option<PathBuf>,

    /// Cache hit counter
    hits: usize,

    /// Cache miss counter
    misses: usize,

    /// Entries added during this run
    added: usize,
}

impl TranslationCache {
    /// Create an empty in-memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache persisted at `path`.
    ///
    /// A missing file yields an empty cache bound to `path`. An unreadable or
    /// malformed file is logged and treated as empty; it is replaced on save.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mut cache = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };

        if !FileManager::file_exists(path) {
            debug!("No translation cache at {:?}, starting empty", path);
            return cache;
        }

        let loaded = FileManager::read_to_string(path).and_then(|content| {
            serde_json::from_str::<BTreeMap<String, String>>(&content)
                .with_context(|| format!("Malformed translation cache: {:?}", path))
        });

        match loaded {
            Ok(entries) => {
                debug!("Loaded {} cached translations from {:?}", entries.len(), path);
                cache.entries = entries;
            }
            Err(e) => warn!("Ignoring translation cache: {:#}", e),
        }

        cache
    }

    /// Write all entries to the bound file. In-memory caches are a no-op.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize translation cache")?;
        FileManager::write_to_file(path, json.as_bytes())?;

        debug!(
            "Saved {} cached translations ({} new) to {:?}",
            self.entries.len(),
            self.added,
            path
        );
        Ok(())
    }

    /// Get a translation from the cache
    pub fn get(&mut self, source_text: &str) -> Option<String> {
        match self.entries.get(source_text) {
            Some(translation) => {
                self.hits += 1;
                debug!("Cache hit for '{}'", truncate_text(source_text, 30));
                Some(translation.clone())
            }
            None => {
                self.misses += 1;
                debug!("Cache miss for '{}'", truncate_text(source_text, 30));
                None
            }
        }
    }

    /// Store a translation. Returns `false` and leaves the entry untouched when
    /// the text is already cached.
    pub fn store(&mut self, source_text: &str, translation: &str) -> bool {
        if self.entries.contains_key(source_text) {
            return false;
        }

        self.entries.insert(source_text.to_string(), translation.to_string());
        self.added += 1;
        debug!("Cached translation for '{}'", truncate_text(source_text, 30));
        true
    }

    /// Whether a text is cached, without touching the counters
    pub fn contains(&self, source_text: &str) -> bool {
        self.entries.contains_key(source_text)
    }

    /// Get cache statistics: (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let total = self.hits + self.misses;

        let hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };

        (self.hits, self.misses, hit_rate)
    }

    /// Entries added since the cache was loaded
    pub fn added(&self) -> usize {
        self.added
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File the cache persists to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
