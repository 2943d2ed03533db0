//! Aggregate retrieval.
//!
//! Fetchers return the document text exactly as transmitted. They never
//! retry; a failure goes straight back to the caller.

use std::time::Duration;

use async_trait::async_trait;
use smp_metadata::{MetadataError, MetadataResult};
use tracing::debug;
use url::Url;

/// Retrieves the raw text of an aggregate.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetches the document at `uri`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Fetch` when the document cannot be retrieved
    /// or is not well-formed XML.
    async fn fetch(&self, uri: &Url) -> MetadataResult<String>;
}

/// Fetches `http`, `https` and `file` URIs.
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    /// Request timeout used by [`new`](Self::new).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a fetcher with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Fetch` if the HTTP client cannot be built.
    pub fn new() -> MetadataResult<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Fetch` if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> MetadataResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MetadataError::Fetch(format!("cannot build HTTP client: {e}")))?;
        Ok(Self::from_client(client))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_http(&self, uri: &Url) -> MetadataResult<Vec<u8>> {
        let response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(|e| MetadataError::Fetch(format!("{uri}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Fetch(format!("{uri}: HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MetadataError::Fetch(format!("{uri}: reading body: {e}")))?;
        Ok(body.to_vec())
    }

    async fn fetch_file(uri: &Url) -> MetadataResult<Vec<u8>> {
        let path = uri
            .to_file_path()
            .map_err(|()| MetadataError::Fetch(format!("{uri}: not a local file path")))?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| MetadataError::Fetch(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, uri: &Url) -> MetadataResult<String> {
        let body = match uri.scheme() {
            "http" | "https" => self.fetch_http(uri).await?,
            "file" => Self::fetch_file(uri).await?,
            other => {
                return Err(MetadataError::Fetch(format!(
                    "{uri}: unsupported scheme {other:?}"
                )))
            }
        };

        // Declared encodings are not honoured: aggregates must be UTF-8.
        let text = String::from_utf8(body).map_err(|e| {
            MetadataError::Fetch(format!(
                "{uri}: body is not UTF-8 (only UTF-8 aggregates are supported): {e}"
            ))
        })?;
        check_well_formed(uri, &text)?;

        debug!(source = %uri, bytes = text.len(), "aggregate fetched");
        Ok(text)
    }
}

/// Rejects text that is not a well-formed XML document. DTDs are refused.
fn check_well_formed(uri: &Url, text: &str) -> MetadataResult<()> {
    roxmltree::Document::parse(text)
        .map(drop)
        .map_err(|e| MetadataError::Fetch(format!("{uri}: not well-formed XML: {e}")))
}
