/*!
 * The merge engine.
 *
 * Sources are applied one at a time in ascending priority. The first source
 * to contribute a channel id owns that channel for the rest of the run, and a
 * programme is only kept when its channel has been accepted and its
 * `(channel, start)` pair has not been seen yet. All bookkeeping lives in a
 * `MergeContext` created per run, so engines can be reused and run side by
 * side.
 */

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::app_config::{ChannelFilters, SourceConfig};
use crate::epg::model::{Channel, Programme, XmlElement, XmltvDocument};
use crate::epg::timeshift;
use crate::errors::EpgError;
use crate::translation::Translator;

/// One source as handed to the engine: its descriptor and what fetching it produced
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Source configuration
    pub descriptor: SourceConfig,
    /// Parsed document, or why it could not be materialized
    pub document: Result<XmltvDocument, EpgError>,
}

impl SourceInput {
    /// Pair a descriptor with its fetch outcome
    pub fn new(descriptor: SourceConfig, document: Result<XmltvDocument, EpgError>) -> Self {
        Self { descriptor, document }
    }

    /// A successfully parsed source
    pub fn loaded(descriptor: SourceConfig, document: XmltvDocument) -> Self {
        Self::new(descriptor, Ok(document))
    }

    /// A source that failed to materialize
    pub fn failed(descriptor: SourceConfig, error: EpgError) -> Self {
        Self::new(descriptor, Err(error))
    }
}

/// A source that contributed nothing because it failed
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    /// Source name
    pub source_name: String,
    /// What went wrong
    pub error: EpgError,
}

/// Statistics for one merge run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Sources merged, in application order
    pub sources_applied: Vec<String>,
    /// Inactive sources
    pub sources_skipped: Vec<String>,
    /// Sources that failed to fetch or parse
    pub failures: Vec<SourceFailure>,
    /// Channels kept
    pub channels_accepted: usize,
    /// Programmes kept
    pub programmes_accepted: usize,
    /// Channels dropped because an earlier source already supplied the id
    pub duplicate_channels: usize,
    /// Programmes dropped because their `(channel, start)` was already taken
    pub duplicate_programmes: usize,
    /// Programmes dropped because their channel was never accepted
    pub orphan_programmes: usize,
    /// Elements dropped by the skip-list or allow-list
    pub filtered: usize,
    /// Elements dropped for lacking an identity attribute
    pub missing_attributes: usize,
}

/// Merged guide plus the run report
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// Channels in acceptance order
    pub channels: Vec<Channel>,
    /// Programmes in acceptance order
    pub programmes: Vec<Programme>,
    /// Run statistics
    pub report: MergeReport,
}

/// Id remapping and channel selection, fixed for the lifetime of an engine
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    aliases: HashMap<String, String>,
    skip_ids: HashSet<String>,
    allow_ids: Option<HashSet<String>>,
}

impl MergeRules {
    /// No remapping, no filtering
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the configured alias table and channel filters
    pub fn from_config(mapping: &BTreeMap<String, String>, filters: &ChannelFilters) -> Self {
        Self {
            aliases: mapping.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            skip_ids: filters.skip_channels.iter().cloned().collect(),
            allow_ids: filters
                .channels
                .as_ref()
                .map(|ids| ids.iter().cloned().collect()),
        }
    }

    /// Map a source id onto another id
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    /// Never accept this id
    pub fn with_skip(mut self, id: impl Into<String>) -> Self {
        self.skip_ids.insert(id.into());
        self
    }

    /// Only accept ids on this list
    pub fn with_allow_list<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Resolved id after aliasing
    pub fn resolve(&self, raw_id: &str) -> String {
        self.aliases
            .get(raw_id)
            .cloned()
            .unwrap_or_else(|| raw_id.to_string())
    }

    /// Resolve an id and apply the skip-list and allow-list. Either the raw or
    /// the resolved spelling may be listed.
    pub fn admit(&self, raw_id: &str) -> Option<String> {
        let id = self.resolve(raw_id);

        if self.skip_ids.contains(&id) || self.skip_ids.contains(raw_id) {
            return None;
        }

        if let Some(allow) = &self.allow_ids {
            if !allow.contains(&id) && !allow.contains(raw_id) {
                return None;
            }
        }

        Some(id)
    }
}

/// Outcome of resolving an element's identity attribute
enum Admission {
    Accepted(String),
    Filtered,
}

/// Per-run state: seen sets, accumulated output and statistics
struct MergeContext<'r> {
    rules: &'r MergeRules,
    seen_channel_ids: HashSet<String>,
    seen_programme_keys: HashSet<(String, String)>,
    channels: Vec<Channel>,
    programmes: Vec<Programme>,
    report: MergeReport,
}

impl<'r> MergeContext<'r> {
    fn new(rules: &'r MergeRules) -> Self {
        Self {
            rules,
            seen_channel_ids: HashSet::new(),
            seen_programme_keys: HashSet::new(),
            channels: Vec::new(),
            programmes: Vec::new(),
            report: MergeReport::default(),
        }
    }

    fn admit(
        &self,
        element: &XmlElement,
        element_name: &'static str,
        attribute: &'static str,
    ) -> Result<Admission, EpgError> {
        let raw_id = element
            .attribute(attribute)
            .filter(|id| !id.is_empty())
            .ok_or(EpgError::FilterMiss { element: element_name, attribute })?;

        Ok(match self.rules.admit(raw_id) {
            Some(id) => Admission::Accepted(id),
            None => Admission::Filtered,
        })
    }

    async fn apply_source(&mut self, source: &SourceConfig, document: XmltvDocument, translator: &mut Translator) {
        let channels_before = self.channels.len();
        let programmes_before = self.programmes.len();

        for element in document.channels {
            self.apply_channel(element, translator).await;
        }

        let offset = source.time_offset.as_deref();
        for element in document.programmes {
            self.apply_programme(element, offset, translator).await;
        }

        info!(
            "Merged {}: +{} channels, +{} programmes",
            source.name,
            self.channels.len() - channels_before,
            self.programmes.len() - programmes_before
        );
        self.report.sources_applied.push(source.name.clone());
    }

    async fn apply_channel(&mut self, element: XmlElement, translator: &mut Translator) {
        let id = match self.admit(&element, "channel", "id") {
            Ok(Admission::Accepted(id)) => id,
            Ok(Admission::Filtered) => {
                self.report.filtered += 1;
                return;
            }
            Err(e) => {
                debug!("Dropping element: {}", e);
                self.report.missing_attributes += 1;
                return;
            }
        };

        if self.seen_channel_ids.contains(&id) {
            self.report.duplicate_channels += 1;
            return;
        }

        let mut channel = Channel::from_element(id.clone(), element);
        if let Some(name) = channel.display_name() {
            let translated = translator.translate(&name, &id).await;
            if translated != name {
                channel.set_display_name(translated);
            }
        }

        self.seen_channel_ids.insert(id);
        self.channels.push(channel);
        self.report.channels_accepted += 1;
    }

    async fn apply_programme(&mut self, element: XmlElement, offset: Option<&str>, translator: &mut Translator) {
        let channel_id = match self.admit(&element, "programme", "channel") {
            Ok(Admission::Accepted(id)) => id,
            Ok(Admission::Filtered) => {
                self.report.filtered += 1;
                return;
            }
            Err(e) => {
                debug!("Dropping element: {}", e);
                self.report.missing_attributes += 1;
                return;
            }
        };

        let start = match element.attribute("start").filter(|s| !s.is_empty()) {
            Some(start) => start.to_string(),
            None => {
                debug!("Dropping programme on {}: missing start", channel_id);
                self.report.missing_attributes += 1;
                return;
            }
        };

        if !self.seen_channel_ids.contains(&channel_id) {
            self.report.orphan_programmes += 1;
            return;
        }

        let source_key = (channel_id.clone(), start.clone());
        if self.seen_programme_keys.contains(&source_key) {
            self.report.duplicate_programmes += 1;
            return;
        }

        let mut programme = Programme::from_element(channel_id.clone(), element);
        let shifted_start = timeshift::shift(&start, offset);
        if let Some(stop) = programme.stop().map(str::to_string) {
            programme.set_stop(timeshift::shift(&stop, offset));
        }
        programme.set_start(shifted_start.clone());

        // The written start must be unique too, not just the source one
        let output_key = (channel_id.clone(), shifted_start);
        if output_key != source_key && self.seen_programme_keys.contains(&output_key) {
            self.report.duplicate_programmes += 1;
            return;
        }

        for field in ["title", "desc"] {
            let text = match field {
                "title" => programme.title(),
                _ => programme.desc(),
            };
            if let Some(text) = text {
                let translated = translator.translate(&text, &channel_id).await;
                if translated != text {
                    programme.set_child_text(field, translated);
                }
            }
        }

        self.seen_programme_keys.insert(source_key);
        self.seen_programme_keys.insert(output_key);
        self.programmes.push(programme);
        self.report.programmes_accepted += 1;
    }

    fn finish(self) -> MergeResult {
        MergeResult {
            channels: self.channels,
            programmes: self.programmes,
            report: self.report,
        }
    }
}

/// Merges parsed sources into one guide
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    rules: MergeRules,
}

impl MergeEngine {
    /// Create an engine with the given rules
    pub fn new(rules: MergeRules) -> Self {
        Self { rules }
    }

    /// The engine's rules
    pub fn rules(&self) -> &MergeRules {
        &self.rules
    }

    /// Merge sources in ascending priority (stable for ties). Inactive sources
    /// are skipped, failed sources are recorded and skipped; neither aborts
    /// the run.
    pub async fn merge(&self, sources: Vec<SourceInput>, translator: &mut Translator) -> MergeResult {
        let mut ordered = sources;
        ordered.sort_by_key(|input| input.descriptor.priority);

        let mut context = MergeContext::new(&self.rules);

        for input in ordered {
            let SourceInput { descriptor, document } = input;

            if !descriptor.active {
                debug!("Skipping inactive source: {}", descriptor.name);
                context.report.sources_skipped.push(descriptor.name);
                continue;
            }

            match document {
                Ok(document) => {
                    info!("Processing: {} (priority {})", descriptor.name, descriptor.priority);
                    context.apply_source(&descriptor, document, translator).await;
                }
                Err(error) => {
                    warn!("Skipping source {} ({}): {}", descriptor.name, error.kind(), error);
                    context.report.failures.push(SourceFailure {
                        source_name: descriptor.name,
                        error,
                    });
                }
            }
        }

        context.finish()
    }
}
