//! Off-screen image fetching over HTTP or from local files.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::domain::errors::FetchError;
use crate::domain::ports::{FetchedImage, ImageFetchPort};
use crate::infrastructure::config::FetchConfig;

/// Errors building an [`HttpImageFetcher`].
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FetcherError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid base URL {url}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where a source resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Absolute `http(s)` URL.
    Remote(String),
    /// Path on the local filesystem.
    Local(PathBuf),
}

/// Fetches and decodes images without touching any visible element.
///
/// Relative sources are resolved against `base_url` when one is configured
/// and read from disk otherwise.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpImageFetcher {
    /// Creates a fetcher from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created or the base URL
    /// does not parse.
    pub fn new(config: &FetchConfig) -> Result<Self, FetcherError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let base_url = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| {
                directory_url(b).map_err(|source| FetcherError::BaseUrl {
                    url: b.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self { client, base_url })
    }

    /// Resolves a source to a remote URL or local path.
    ///
    /// # Errors
    /// Returns error for an empty source, an unsupported scheme, or a
    /// relative source that cannot be resolved against the base URL.
    pub fn locate(&self, url: &str) -> Result<SourceLocation, FetchError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(FetchError::failed(url, "empty source"));
        }

        match Url::parse(trimmed) {
            Ok(parsed) => match parsed.scheme() {
                "http" | "https" => Ok(SourceLocation::Remote(parsed.into())),
                "file" => parsed
                    .to_file_path()
                    .map(SourceLocation::Local)
                    .map_err(|()| FetchError::failed(url, "invalid file URL")),
                scheme => Err(FetchError::failed(url, format!("unsupported scheme {scheme}"))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base
                    .join(trimmed)
                    .map(|joined| SourceLocation::Remote(joined.into()))
                    .map_err(|e| FetchError::failed(url, format!("cannot resolve against base: {e}"))),
                None => Ok(SourceLocation::Local(PathBuf::from(trimmed))),
            },
            Err(e) => Err(FetchError::failed(url, format!("invalid URL: {e}"))),
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::failed(url, format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::failed(
                url,
                format!(
                    "HTTP {}: {}",
                    response.status(),
                    response.status().canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::failed(url, format!("Failed to read body: {e}")))
    }

    async fn read_local(url: &str, path: PathBuf) -> Result<Bytes, FetchError> {
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| FetchError::failed(url, format!("Failed to read {}: {e}", path.display())))
    }

    async fn decode(url: &str, bytes: Bytes) -> Result<FetchedImage, FetchError> {
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| FetchError::failed(url, format!("Decode task panicked: {e}")))?
            .map_err(|e| FetchError::failed(url, format!("Decode failed: {e}")))?;

        Ok(FetchedImage {
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    async fn fetch_inner(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let bytes = match self.locate(url)? {
            SourceLocation::Remote(remote) => {
                debug!(url = %remote, "Downloading image from network");
                self.download(&remote).await?
            }
            SourceLocation::Local(path) => {
                debug!(path = %path.display(), "Reading image from disk");
                Self::read_local(url, path).await?
            }
        };

        Self::decode(url, bytes).await
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let result = self.fetch_inner(url).await;
        if let Err(e) = &result {
            warn!(error = %e, "Image fetch failed");
        }
        result
    }
}

/// Parses a base URL, treating its last path segment as a directory so
/// `https://cdn.example.com/assets` resolves `a.jpg` under `assets/`.
///
/// # Errors
/// Returns error if `base` is not an absolute URL.
pub fn directory_url(base: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
