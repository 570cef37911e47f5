/*!
 * Error types for the epgmerge application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * `EpgError` carries the per-operation error kinds of the merge path. None of
 * them is fatal to a run: the merge engine branches on the kind and either
 * skips the source, keeps the original value, or drops the element.
 */

use thiserror::Error;

/// Errors produced while materializing or merging EPG data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EpgError {
    /// The source could not be retrieved (network, HTTP status, IO)
    #[error("Failed to fetch source '{source_name}': {message}")]
    SourceFetch {
        /// Name of the configured source
        source_name: String,
        /// Underlying failure description
        message: String,
    },

    /// The source did not answer within its configured timeout
    #[error("Source '{source_name}' timed out after {timeout_secs}s")]
    SourceTimeout {
        /// Name of the configured source
        source_name: String,
        /// Timeout that was exceeded
        timeout_secs: u64,
    },

    /// The source payload is not a readable XMLTV document
    #[error("Failed to parse source '{source_name}': {message}")]
    SourceParse {
        /// Name of the configured source
        source_name: String,
        /// Parser error description
        message: String,
    },

    /// A timestamp or offset could not be interpreted
    #[error("Invalid timestamp '{timestamp}' or offset '{offset}'")]
    TimeParse {
        /// Timestamp as found in the source
        timestamp: String,
        /// Offset as configured for the source
        offset: String,
    },

    /// An element lacks an attribute required for its identity
    #[error("<{element}> is missing required attribute '{attribute}'")]
    FilterMiss {
        /// Element name (`channel` or `programme`)
        element: &'static str,
        /// Missing attribute name
        attribute: &'static str,
    },
}

impl EpgError {
    /// Short, stable name of the error kind, used in run reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceFetch { .. } => "SourceFetchError",
            Self::SourceTimeout { .. } => "SourceTimeoutError",
            Self::SourceParse { .. } => "SourceParseError",
            Self::TimeParse { .. } => "TimeParseError",
            Self::FilterMiss { .. } => "FilterMiss",
        }
    }

    /// Whether this error means the whole source document is unavailable
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceFetch { .. } | Self::SourceTimeout { .. } | Self::SourceParse { .. }
        )
    }
}

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered but produced nothing usable
    #[error("Empty translation returned for '{0}'")]
    EmptyResult(String),
}
