/*!
 * Tests for error kinds and messages
 */

use epgmerge::errors::{EpgError, ProviderError, TranslationError};

#[test]
fn test_epgError_kind_shouldNameEachVariant() {
    let fetch = EpgError::SourceFetch { source_name: "a".into(), message: "refused".into() };
    let timeout = EpgError::SourceTimeout { source_name: "a".into(), timeout_secs: 5 };
    let parse = EpgError::SourceParse { source_name: "a".into(), message: "truncated".into() };
    let time = EpgError::TimeParse { timestamp: "x".into(), offset: "+0100".into() };
    let miss = EpgError::FilterMiss { element: "channel", attribute: "id" };

    assert_eq!(fetch.kind(), "SourceFetchError");
    assert_eq!(timeout.kind(), "SourceTimeoutError");
    assert_eq!(parse.kind(), "SourceParseError");
    assert_eq!(time.kind(), "TimeParseError");
    assert_eq!(miss.kind(), "FilterMiss");
}

#[test]
fn test_epgError_isSourceFailure_shouldOnlyCoverWholeSourceErrors() {
    assert!(EpgError::SourceTimeout { source_name: "a".into(), timeout_secs: 5 }.is_source_failure());
    assert!(!EpgError::FilterMiss { element: "programme", attribute: "start" }.is_source_failure());
}

#[test]
fn test_epgError_display_shouldIncludeContext() {
    let err = EpgError::SourceTimeout { source_name: "primary".into(), timeout_secs: 30 };
    assert_eq!(err.to_string(), "Source 'primary' timed out after 30s");

    let err = EpgError::FilterMiss { element: "programme", attribute: "channel" };
    assert_eq!(err.to_string(), "<programme> is missing required attribute 'channel'");
}

#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let err: TranslationError = ProviderError::RateLimitExceeded("slow down".into()).into();
    assert!(matches!(err, TranslationError::Provider(_)));
    assert!(err.to_string().contains("slow down"));
}
