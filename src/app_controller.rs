use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::app_config::{ChannelFilters, Config, SourceConfig};
use crate::epg::xmltv::write_document;
use crate::epg::{MergeEngine, MergeReport, MergeRules, SourceFetcher, SourceInput, XmltvDocument};
use crate::file_utils::FileManager;
use crate::translation::{TranslationStats, Translator};

// @module: Application controller for guide merging

/// Outcome of one full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Merge statistics
    pub report: MergeReport,
    /// Path of the plain XMLTV output
    pub output_path: PathBuf,
    /// Path of the gzip copy, when written
    pub compressed_path: Option<PathBuf>,
    /// Entries in the translation cache after the run
    pub cache_entries: usize,
    /// Translation counters
    pub translation: TranslationStats,
}

/// Main application controller: fetch, merge, translate, write
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Source retrieval
    fetcher: SourceFetcher,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        Ok(Self {
            config,
            fetcher: SourceFetcher::new(),
        })
    }

    /// Replace the source fetcher
    pub fn with_fetcher(mut self, fetcher: SourceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline with a translator built from the configuration
    pub async fn run(&self) -> Result<RunSummary> {
        let filters = self.config.effective_filters()?;
        let translator = Translator::from_config(&self.config.translation, &filters)?;
        self.execute(translator, &filters).await
    }

    /// Run the whole pipeline with an explicit translator
    pub async fn run_with_translator(&self, translator: Translator) -> Result<RunSummary> {
        let filters = self.config.effective_filters()?;
        self.execute(translator, &filters).await
    }

    async fn execute(&self, mut translator: Translator, filters: &ChannelFilters) -> Result<RunSummary> {
        let started = Instant::now();
        let inputs = self.fetch_sources().await;

        let engine = MergeEngine::new(MergeRules::from_config(&self.config.mapping, filters));
        let merged = engine.merge(inputs, &mut translator).await;

        translator
            .save_cache()
            .context("Failed to save translation cache")?;

        let xml = write_document(&merged.channels, &merged.programmes, &self.config.generator_name);
        let output_path = PathBuf::from(&self.config.output_file);
        FileManager::write_to_file(&output_path, xml.as_bytes())
            .with_context(|| format!("Failed to write merged guide: {:?}", output_path))?;
        info!("Wrote {:?}", output_path);

        let compressed_path = if self.config.compress_output {
            let path = FileManager::gzip_sibling(&output_path);
            FileManager::write_gzip(&path, xml.as_bytes())
                .with_context(|| format!("Failed to write compressed guide: {:?}", path))?;
            info!("Wrote {:?}", path);
            Some(path)
        } else {
            None
        };

        let report = merged.report;
        for failure in &report.failures {
            warn!("Source {} contributed nothing: {}", failure.source_name, failure.error);
        }

        let (hits, misses, _) = translator.cache().stats();
        if translator.is_enabled() {
            info!(
                "Translation: {} cache hits, {} misses, {} new entries",
                hits,
                misses,
                translator.cache().added()
            );
        }

        info!(
            "Done in {}: {} channels, {} programmes from {} source(s), {} failed",
            Self::format_duration(started.elapsed()),
            report.channels_accepted,
            report.programmes_accepted,
            report.sources_applied.len(),
            report.failures.len()
        );

        Ok(RunSummary {
            report,
            output_path,
            compressed_path,
            cache_entries: translator.cache().len(),
            translation: translator.stats().clone(),
        })
    }

    /// Fetch all active sources concurrently. Inactive sources are passed
    /// through unfetched so the merge can report them as skipped.
    async fn fetch_sources(&self) -> Vec<SourceInput> {
        let active: Vec<SourceConfig> = self
            .config
            .sources
            .iter()
            .filter(|source| source.active)
            .cloned()
            .collect();

        let progress_bar = ProgressBar::new(active.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sources ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let results = self.fetcher.fetch_all(&active, Some(&progress_bar)).await;
        progress_bar.finish_and_clear();

        let mut fetched = active.into_iter().zip(results);
        let mut inputs = Vec::with_capacity(self.config.sources.len());

        for source in &self.config.sources {
            if source.active {
                if let Some((descriptor, document)) = fetched.next() {
                    inputs.push(SourceInput::new(descriptor, document));
                }
            } else {
                inputs.push(SourceInput::loaded(source.clone(), XmltvDocument::default()));
            }
        }

        inputs
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        if total_secs >= 60 {
            format!("{}m {}s", total_secs / 60, total_secs % 60)
        } else {
            format!("{}.{:01}s", total_secs, duration.subsec_millis() / 100)
        }
    }
}
