/*!
 * # epgmerge - XMLTV guide merger
 *
 * A Rust library that combines several XMLTV electronic programme guides
 * into a single guide.
 *
 * ## Features
 *
 * - Fetch sources over HTTP(S) or from local files, gzip-compressed or not
 * - Priority-ordered merge: the first source to supply a channel owns it
 * - Programme de-duplication on `(channel, start)`
 * - Per-source time offsets
 * - Channel id remapping, skip-lists and allow-lists
 * - Optional, cached translation of channel names, titles and descriptions:
 *   - Google Translate web endpoint
 *   - Ollama (local LLM)
 * - Plain and gzip-compressed XMLTV output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `epg`: XMLTV model, reader/writer, fetching, time shifting and merging
 * - `translation`: Translator and its persistent cache
 * - `providers`: Translation backends
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod epg;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, SourceConfig};
pub use app_controller::{Controller, RunSummary};
pub use epg::{Channel, MergeEngine, MergeReport, MergeRules, Programme, SourceInput};
pub use errors::{EpgError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use translation::{TranslationCache, Translator};
