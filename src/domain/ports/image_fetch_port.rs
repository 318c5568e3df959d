//! Port definition for off-screen image fetching.

use async_trait::async_trait;

use crate::domain::errors::FetchError;

/// Details of a successfully fetched image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchedImage {
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
}

/// Port for fetching an image without touching the visible element.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Fetches and decodes the image at `url`.
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Mock fetcher for testing.
    pub struct MockImageFetcher {
        fail_all: bool,
        failing: HashSet<String>,
        latency: Duration,
        requests: Mutex<Vec<String>>,
    }

    impl MockImageFetcher {
        /// Creates a fetcher where every request succeeds.
        pub fn succeeding() -> Self {
            Self {
                fail_all: false,
                failing: HashSet::new(),
                latency: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Creates a fetcher where every request fails.
        pub fn failing() -> Self {
            Self {
                fail_all: true,
                ..Self::succeeding()
            }
        }

        /// Creates a fetcher that fails only for the given URLs.
        pub fn failing_for<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
            Self {
                failing: urls.into_iter().map(String::from).collect(),
                ..Self::succeeding()
            }
        }

        /// Delays every response.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Returns every requested URL in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl ImageFetchPort for MockImageFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
            self.requests.lock().push(url.to_string());
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            if self.fail_all || self.failing.contains(url) {
                Err(FetchError::failed(url, "mock failure"))
            } else {
                Ok(FetchedImage {
                    width: 1,
                    height: 1,
                })
            }
        }
    }
}
