/*!
 * Translation of guide texts.
 *
 * - `core`: the per-channel, cache-first translator used by the merge
 * - `cache`: persistent memo of earlier translations
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::core::{TranslationStats, Translator};

// Submodules
pub mod cache;
pub mod core;
