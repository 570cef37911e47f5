/*!
 * Source retrieval.
 *
 * A source is either a remote `http(s)://` URL or a local file (plain path or
 * `file://` URL). Payloads may arrive gzip-compressed; they are detected by
 * their magic bytes rather than by name or content type. Each fetch, including
 * decompression and parsing, is bounded by the source's timeout.
 */

use bytes::Bytes;
use futures::future::join_all;
use indicatif::ProgressBar;
use log::{debug, info};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::app_config::SourceConfig;
use crate::epg::model::XmltvDocument;
use crate::epg::xmltv::parse_document;
use crate::errors::EpgError;
use crate::file_utils::FileManager;

/// Where a source payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Fetched over HTTP(S)
    Remote(Url),
    /// Read from the local filesystem
    Local(PathBuf),
}

impl SourceLocation {
    /// Classify a configured source url
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(_) => Self::Local(PathBuf::from(url.path())),
            },
            // Relative paths and Windows drive letters end up here
            _ => Self::Local(PathBuf::from(raw)),
        }
    }
}

/// Fetches and parses source documents
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    /// HTTP client for remote sources
    client: Client,
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher {
    /// Create a fetcher with a default HTTP client
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("epgmerge/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch, decompress and parse one source within its timeout
    pub async fn fetch(&self, source: &SourceConfig) -> Result<XmltvDocument, EpgError> {
        let timeout = Duration::from_secs(source.timeout_secs);

        match tokio::time::timeout(timeout, self.fetch_and_parse(source)).await {
            Ok(result) => result,
            Err(_) => Err(EpgError::SourceTimeout {
                source_name: source.name.clone(),
                timeout_secs: source.timeout_secs,
            }),
        }
    }

    /// Fetch several sources concurrently. Results come back in input order.
    pub async fn fetch_all(
        &self,
        sources: &[SourceConfig],
        progress: Option<&ProgressBar>,
    ) -> Vec<Result<XmltvDocument, EpgError>> {
        let fetches = sources.iter().map(|source| async move {
            let result = self.fetch(source).await;
            if let Some(progress) = progress {
                progress.inc(1);
            }
            result
        });

        join_all(fetches).await
    }

    async fn fetch_and_parse(&self, source: &SourceConfig) -> Result<XmltvDocument, EpgError> {
        info!("Fetching: {} ({})", source.name, source.url);

        let payload = self.retrieve(source).await?;
        debug!("Received {} bytes from {}", payload.len(), source.name);

        let xml = if FileManager::is_gzip(&payload) {
            FileManager::gunzip(&payload).map_err(|e| EpgError::SourceParse {
                source_name: source.name.clone(),
                message: format!("gzip decoding failed: {}", e),
            })?
        } else {
            payload.to_vec()
        };

        let document = parse_document(&source.name, &xml)?;
        debug!(
            "Parsed {}: {} channels, {} programmes",
            source.name,
            document.channels.len(),
            document.programmes.len()
        );

        Ok(document)
    }

    async fn retrieve(&self, source: &SourceConfig) -> Result<Bytes, EpgError> {
        let fetch_error = |message: String| EpgError::SourceFetch {
            source_name: source.name.clone(),
            message,
        };

        match SourceLocation::parse(&source.url) {
            SourceLocation::Remote(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(fetch_error(format!("HTTP {}", status)));
                }

                response.bytes().await.map_err(|e| fetch_error(e.to_string()))
            }
            SourceLocation::Local(path) => tokio::fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|e| fetch_error(format!("{:?}: {}", path, e))),
        }
    }
}
