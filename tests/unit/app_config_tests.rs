/*!
 * Tests for configuration loading and validation
 */

use std::str::FromStr;

use epgmerge::app_config::{ChannelFilters, Config, LogLevel, SourceConfig, TranslationProvider};

use crate::common::{create_temp_dir, create_test_file};

const SAMPLE_CONFIG: &str = r#"{
    "sources": [
        { "name": "primary", "url": "https://example.com/guide.xml.gz", "priority": 1 },
        { "name": "backup", "url": "guides/backup.xml", "priority": 2, "offset": "+0100", "active": false }
    ],
    "output_file": "out/merged.xml",
    "mapping": { "BBCOne.uk": "bbc1.uk" },
    "filters": { "skip_channels": ["shop.uk"], "translate_channels": ["fr1"] },
    "translation": { "enabled": true, "target_lang": "de", "provider": "ollama" },
    "log_level": "debug"
}"#;

#[test]
fn test_fromFile_withSampleConfig_shouldReadAllSections() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", SAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources[1].time_offset.as_deref(), Some("+0100"));
    assert!(!config.sources[1].active);
    assert_eq!(config.sources[0].timeout_secs, 60);
    assert_eq!(config.output_file, "out/merged.xml");
    assert!(config.compress_output);
    assert_eq!(config.mapping.get("BBCOne.uk").map(String::as_str), Some("bbc1.uk"));
    assert_eq!(config.filters.skip_channels, vec!["shop.uk".to_string()]);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_model(), "llama3.2:3b");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_shouldBeValidAndEmpty() {
    let config = Config::default();

    assert!(config.sources.is_empty());
    assert_eq!(config.output_file, "merged_epg.xml");
    assert!(!config.translation.enabled);
    assert_eq!(config.channels_file.as_deref(), Some("channels.json"));
    assert_eq!(config.translation.retry_count, 0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_fromFile_withoutChannelsFileKey_shouldLoadChannelListNextToConfig() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{ "sources": [], "filters": { "skip_channels": ["shop.uk"] } }"#,
    )
    .unwrap();
    create_test_file(
        dir.path(),
        "channels.json",
        r#"{ "translate_channels": ["fr1", "de1"], "channels": ["fr1", "de1", "bbc1.uk"] }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let filters = config.effective_filters().unwrap();

    assert_eq!(filters.skip_channels, vec!["shop.uk".to_string()]);
    assert_eq!(filters.translate_channels, vec!["fr1".to_string(), "de1".to_string()]);
    assert_eq!(
        filters.channels,
        Some(vec!["fr1".to_string(), "de1".to_string(), "bbc1.uk".to_string()])
    );
}

#[test]
fn test_fromFile_withNullChannelsFile_shouldIgnoreChannelList() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", r#"{ "sources": [], "channels_file": null }"#).unwrap();
    create_test_file(dir.path(), "channels.json", r#"{ "translate_channels": ["fr1"] }"#).unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.channels_file, None);
    assert!(config.effective_filters().unwrap().translate_channels.is_empty());
}

#[test]
fn test_saveThenLoad_shouldRoundTrip() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.sources.push(SourceConfig::new("local", "guide.xml").with_offset("-0200"));
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.sources, config.sources);
}

#[test]
fn test_validate_withDuplicateSourceNames_shouldFail() {
    let mut config = Config::default();
    config.sources.push(SourceConfig::new("dup", "a.xml"));
    config.sources.push(SourceConfig::new("dup", "b.xml"));

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvalidOffset_shouldFail() {
    let mut config = Config::default();
    config.sources.push(SourceConfig::new("a", "a.xml").with_offset("5:30"));

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("time_offset"));
}

#[test]
fn test_validate_withZeroTimeoutOrEmptyUrl_shouldFail() {
    let mut config = Config::default();
    config.sources.push(SourceConfig::new("a", "a.xml").with_timeout_secs(0));
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.sources.push(SourceConfig::new("a", "  "));
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvalidTargetLanguage_shouldFailOnlyWhenEnabled() {
    let mut config = Config::default();
    config.translation.target_lang = "xx".to_string();
    assert!(config.validate().is_ok());

    config.translation.enabled = true;
    assert!(config.validate().is_err());
}

#[test]
fn test_effectiveFilters_withChannelsFile_shouldMergeLists() {
    let dir = create_temp_dir().unwrap();
    let channels = create_test_file(
        dir.path(),
        "channels.json",
        r#"{ "skip_channels": ["adult.xx", "shop.uk"], "channels": ["bbc1.uk"] }"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.filters.skip_channels = vec!["shop.uk".to_string()];
    config.channels_file = Some(channels.to_string_lossy().to_string());

    let filters = config.effective_filters().unwrap();
    assert_eq!(filters.skip_channels, vec!["shop.uk".to_string(), "adult.xx".to_string()]);
    assert_eq!(filters.channels, Some(vec!["bbc1.uk".to_string()]));
}

#[test]
fn test_effectiveFilters_withMissingChannelsFile_shouldUseConfigFilters() {
    let mut config = Config::default();
    config.filters.translate_channels = vec!["fr1".to_string()];
    config.channels_file = Some("does/not/exist.json".to_string());

    let filters = config.effective_filters().unwrap();
    assert_eq!(filters, config.filters);
}

#[test]
fn test_channelFilters_extend_shouldUnionAllowLists() {
    let mut filters = ChannelFilters {
        channels: Some(vec!["a".to_string()]),
        ..ChannelFilters::default()
    };
    filters.extend(ChannelFilters {
        channels: Some(vec!["a".to_string(), "b".to_string()]),
        ..ChannelFilters::default()
    });

    assert_eq!(filters.channels, Some(vec!["a".to_string(), "b".to_string()]));
}

#[test]
fn test_translationProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(TranslationProvider::from_str("Google").unwrap(), TranslationProvider::Google);
    assert_eq!(TranslationProvider::from_str("OLLAMA").unwrap(), TranslationProvider::Ollama);
    assert!(TranslationProvider::from_str("deepl").is_err());
    assert_eq!(TranslationProvider::Ollama.to_string(), "ollama");
}
