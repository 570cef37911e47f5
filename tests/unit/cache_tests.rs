/*!
 * Tests for translation cache functionality
 */

use epgmerge::translation::cache::TranslationCache;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_cache_store_shouldMakeEntryRetrievable() {
    let mut cache = TranslationCache::new();
    assert!(cache.store("Bonjour", "Hello"));

    assert_eq!(cache.get("Bonjour"), Some("Hello".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_get_withMissingKey_shouldReturnNone() {
    let mut cache = TranslationCache::new();
    assert!(cache.get("nonexistent").is_none());
}

#[test]
fn test_cache_store_withExistingKey_shouldNotOverwrite() {
    let mut cache = TranslationCache::new();
    cache.store("Bonjour", "Hello");

    assert!(!cache.store("Bonjour", "Good morning"));
    assert_eq!(cache.get("Bonjour"), Some("Hello".to_string()));
    assert_eq!(cache.added(), 1);
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let mut cache = TranslationCache::new();
    cache.store("Bonjour", "Hello");

    cache.get("Bonjour");
    cache.get("Bonjour");
    cache.get("Salut");

    let (hits, misses, rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_saveThenLoad_shouldPersistEntries() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("cache.json");

    let mut cache = TranslationCache::load(&path);
    assert!(cache.is_empty());
    cache.store("Bonjour", "Hello");
    cache.store("Le Journal", "The News");
    cache.save().unwrap();

    let mut reloaded = TranslationCache::load(&path);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.added(), 0);
    assert_eq!(reloaded.get("Le Journal"), Some("The News".to_string()));
    assert_eq!(reloaded.path(), Some(path.as_path()));
}

#[test]
fn test_cache_load_withCorruptFile_shouldStartEmpty() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "cache.json", "{ not json").unwrap();

    let cache = TranslationCache::load(&path);
    assert!(cache.is_empty());
    assert_eq!(cache.path(), Some(path.as_path()));
}

#[test]
fn test_cache_save_withoutPath_shouldBeNoop() {
    let mut cache = TranslationCache::new();
    cache.store("Bonjour", "Hello");
    assert!(cache.save().is_ok());
    assert!(cache.path().is_none());
}
