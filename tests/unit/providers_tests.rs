/*!
 * Tests for translation backends
 */

use epgmerge::app_config::{TranslationConfig, TranslationProvider};
use epgmerge::errors::ProviderError;
use epgmerge::providers::mock::{MockBehavior, MockProvider};
use epgmerge::providers::{create_backend, TranslationBackend};

#[test]
fn test_createBackend_shouldFollowConfiguredProvider() {
    let google = create_backend(&TranslationConfig::default()).unwrap();
    assert_eq!(google.name(), "google");

    let config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        ..TranslationConfig::default()
    };
    let ollama = create_backend(&config).unwrap();
    assert_eq!(ollama.name(), "ollama");
}

#[tokio::test]
async fn test_google_withUnknownTargetLanguage_shouldFailBeforeRequest() {
    let google = create_backend(&TranslationConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        ..TranslationConfig::default()
    })
    .unwrap();

    let err = google.translate("Bonsoir", "not-a-language").await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}

#[tokio::test]
async fn test_mockProvider_slowBehavior_shouldStillTranslate() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 10 });
    assert_eq!(provider.translate("Bonsoir", "en").await.unwrap(), "[en] Bonsoir");
}

#[tokio::test]
async fn test_mockProvider_slowBehavior_shouldHitCallerTimeout() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 500 });
    let outcome = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        provider.translate("Bonsoir", "en"),
    )
    .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_mockProvider_emptyBehavior_shouldReturnEmptyString() {
    let provider = MockProvider::empty();
    assert_eq!(provider.translate("Bonsoir", "en").await.unwrap(), "");
    assert_eq!(provider.request_count(), 1);
}
