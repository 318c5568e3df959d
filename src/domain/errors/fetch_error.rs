//! Image fetch error types.

use thiserror::Error;

/// The only failure the loader recognizes.
/// Network errors, bad status codes and decode errors are not distinguished.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("failed to fetch image {url}: {reason}")]
    FetchFailed { url: String, reason: String },
}

impl FetchError {
    /// Creates fetch failed error.
    #[must_use]
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the URL that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::FetchFailed { url, .. } => url,
        }
    }
}
