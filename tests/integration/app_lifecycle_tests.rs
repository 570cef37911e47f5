/*!
 * End-to-end runs of the controller against local sources
 */

use std::fs;

use epgmerge::app_config::{Config, SourceConfig};
use epgmerge::epg::xmltv::parse_document;
use epgmerge::file_utils::FileManager;
use epgmerge::providers::mock::MockProvider;
use epgmerge::translation::{TranslationCache, Translator};
use epgmerge::Controller;

use crate::common::{create_gzip_file, create_temp_dir, create_test_file, init_test_logging, xmltv_with};

fn config_for(dir: &std::path::Path, sources: Vec<SourceConfig>) -> Config {
    init_test_logging();
    Config {
        sources,
        output_file: dir.join("out").join("merged.xml").to_string_lossy().to_string(),
        channels_file: Some(dir.join("channels.json").to_string_lossy().to_string()),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_run_withTwoSources_shouldWriteMergedGuideAndGzipCopy() {
    let dir = create_temp_dir().unwrap();
    let primary = create_test_file(
        dir.path(),
        "primary.xml",
        &xmltv_with("ch1", "Hello", &[("20250101120000 +0000", "Noon")]),
    )
    .unwrap();
    let secondary = create_gzip_file(
        dir.path(),
        "secondary.xml.gz",
        &xmltv_with("ch1", "Bonjour", &[("20250101120000 +0000", "Midi"), ("20250101130000 +0000", "Apres-midi")]),
    )
    .unwrap();

    let config = config_for(
        dir.path(),
        vec![
            SourceConfig::new("secondary", secondary.to_string_lossy()).with_priority(2),
            SourceConfig::new("primary", primary.to_string_lossy()).with_priority(1),
        ],
    );

    let controller = Controller::with_config(config).unwrap();
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.report.channels_accepted, 1);
    assert_eq!(summary.report.programmes_accepted, 2);

    let written = fs::read(&summary.output_path).unwrap();
    let document = parse_document("output", &written).unwrap();
    assert_eq!(document.channels.len(), 1);
    assert_eq!(document.channels[0].child("display-name").unwrap().text(), "Hello");
    assert_eq!(document.programmes.len(), 2);

    let compressed = fs::read(summary.compressed_path.unwrap()).unwrap();
    assert_eq!(FileManager::gunzip(&compressed).unwrap(), written);
}

#[tokio::test]
async fn test_run_withFailingSource_shouldStillWriteOutput() {
    let dir = create_temp_dir().unwrap();
    let good = create_test_file(dir.path(), "good.xml", &xmltv_with("ch1", "One", &[])).unwrap();

    let mut config = config_for(
        dir.path(),
        vec![
            SourceConfig::new("missing", dir.path().join("missing.xml").to_string_lossy()),
            SourceConfig::new("good", good.to_string_lossy()).with_priority(200),
        ],
    );
    config.compress_output = false;

    let summary = Controller::with_config(config).unwrap().run().await.unwrap();

    assert_eq!(summary.report.failures.len(), 1);
    assert_eq!(summary.report.failures[0].source_name, "missing");
    assert_eq!(summary.report.channels_accepted, 1);
    assert!(summary.compressed_path.is_none());
    assert!(FileManager::file_exists(&summary.output_path));
}

#[tokio::test]
async fn test_run_withInactiveSource_shouldNotReadIt() {
    let dir = create_temp_dir().unwrap();
    let good = create_test_file(dir.path(), "good.xml", &xmltv_with("ch1", "One", &[])).unwrap();

    // The inactive source points at a file that does not exist; it must not be fetched
    let config = config_for(
        dir.path(),
        vec![
            SourceConfig::new("off", dir.path().join("absent.xml").to_string_lossy()).with_active(false),
            SourceConfig::new("good", good.to_string_lossy()),
        ],
    );

    let summary = Controller::with_config(config).unwrap().run().await.unwrap();

    assert!(summary.report.failures.is_empty());
    assert_eq!(summary.report.sources_skipped, vec!["off".to_string()]);
}

#[tokio::test]
async fn test_run_withChannelList_shouldApplyItsAllowList() {
    let dir = create_temp_dir().unwrap();
    let first = create_test_file(dir.path(), "first.xml", &xmltv_with("keep.uk", "Keep", &[("20250101120000 +0000", "Kept")]))
        .unwrap();
    let second = create_test_file(dir.path(), "second.xml", &xmltv_with("drop.uk", "Drop", &[("20250101120000 +0000", "Dropped")]))
        .unwrap();
    create_test_file(dir.path(), "channels.json", r#"{ "channels": ["keep.uk"] }"#).unwrap();

    let mut config = config_for(
        dir.path(),
        vec![
            SourceConfig::new("first", first.to_string_lossy()).with_priority(1),
            SourceConfig::new("second", second.to_string_lossy()).with_priority(2),
        ],
    );
    config.compress_output = false;

    let summary = Controller::with_config(config).unwrap().run().await.unwrap();

    assert_eq!(summary.report.channels_accepted, 1);
    assert_eq!(summary.report.programmes_accepted, 1);

    let written = fs::read(&summary.output_path).unwrap();
    let document = parse_document("output", &written).unwrap();
    assert_eq!(document.channels.len(), 1);
    assert_eq!(document.channels[0].attribute("id"), Some("keep.uk"));
    assert_eq!(document.programmes[0].attribute("channel"), Some("keep.uk"));
}

#[tokio::test]
async fn test_run_withTranslation_shouldPersistCacheAcrossRuns() {
    let dir = create_temp_dir().unwrap();
    let guide = create_test_file(
        dir.path(),
        "fr.xml",
        &xmltv_with("fr1", "Chaine Une", &[("20250101200000 +0100", "Le Journal")]),
    )
    .unwrap();
    let cache_path = dir.path().join("cache.json");

    let mut config = config_for(dir.path(), vec![SourceConfig::new("fr", guide.to_string_lossy())]);
    config.filters.translate_channels = vec!["fr1".to_string()];
    config.translation.cache_file = cache_path.to_string_lossy().to_string();

    let controller = Controller::with_config(config).unwrap();

    let first_mock = MockProvider::working();
    let translator = Translator::new(
        Box::new(first_mock.clone()),
        "en",
        ["fr1"],
        TranslationCache::load(&cache_path),
    );
    let first = controller.run_with_translator(translator).await.unwrap();
    assert_eq!(first_mock.request_count(), 2);
    assert_eq!(first.cache_entries, 2);

    let second_mock = MockProvider::working();
    let translator = Translator::new(
        Box::new(second_mock.clone()),
        "en",
        ["fr1"],
        TranslationCache::load(&cache_path),
    );
    let second = controller.run_with_translator(translator).await.unwrap();

    assert_eq!(second_mock.request_count(), 0);
    assert_eq!(second.translation.cache_hits, 2);

    let written = fs::read(&second.output_path).unwrap();
    let document = parse_document("output", &written).unwrap();
    assert_eq!(document.programmes[0].child("title").unwrap().text(), "[en] Le Journal");
}

#[test]
fn test_withConfig_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.sources.push(SourceConfig::new("bad", "a.xml").with_offset("+99"));

    assert!(Controller::with_config(config).is_err());
}
