//! Load attempts: derive the URL, fetch off-screen, then swap or fall back.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::entities::{ElementAttributes, ImageElement, LazyConfig, LoadEvent, LoadOutcome};
use crate::domain::ports::{FormatProbePort, ImageFetchPort, UrlTransformerPort};

use super::param_resolver::resolve_params;

/// Counts attempts that have started but not yet settled.
#[derive(Debug, Default)]
struct AttemptTracker {
    in_flight: AtomicUsize,
    idle: Notify,
}

impl AttemptTracker {
    fn begin(self: &Arc<Self>) -> AttemptGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        AttemptGuard(Arc::clone(self))
    }
}

/// Marks an attempt settled when dropped, even if the task panicked.
struct AttemptGuard(Arc<AttemptTracker>);

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Runs load attempts for attached elements.
///
/// Each attempt writes the element's visible source at most once: the derived
/// URL after `swap_delay` when the fetch succeeds, or the first available
/// fallback immediately when it fails. Fetch errors never leave the loader.
/// Attempts cannot be cancelled once started.
#[derive(Clone)]
pub struct ImageLoader {
    transformer: Arc<dyn UrlTransformerPort>,
    fetcher: Arc<dyn ImageFetchPort>,
    probe: Arc<dyn FormatProbePort>,
    config: Arc<LazyConfig>,
    event_tx: Option<mpsc::UnboundedSender<LoadEvent>>,
    attempts: Arc<AttemptTracker>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a new loader.
    #[must_use]
    pub fn new(
        transformer: Arc<dyn UrlTransformerPort>,
        fetcher: Arc<dyn ImageFetchPort>,
        probe: Arc<dyn FormatProbePort>,
        config: Arc<LazyConfig>,
    ) -> Self {
        Self {
            transformer,
            fetcher,
            probe,
            config,
            event_tx: None,
            attempts: Arc::new(AttemptTracker::default()),
        }
    }

    /// Publishes a [`LoadEvent`] for every settled attempt.
    #[must_use]
    pub fn with_events(mut self, event_tx: &mpsc::UnboundedSender<LoadEvent>) -> Self {
        self.event_tx = Some(event_tx.clone());
        self
    }

    /// Returns the global configuration.
    #[must_use]
    pub fn config(&self) -> &LazyConfig {
        &self.config
    }

    /// Derives the fetch URL for an element.
    #[must_use]
    pub fn derive_url(&self, attributes: &ElementAttributes) -> String {
        let params = resolve_params(attributes, &self.config, self.probe.as_ref());
        self.transformer
            .derive_url(attributes.base_source(), &params)
    }

    /// Starts a load attempt and forgets about it.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn load(&self, element: Arc<ImageElement>) {
        let _attempt = self.spawn_attempt(element);
    }

    /// Starts a load attempt and returns a handle resolving to its outcome.
    ///
    /// Parameters are resolved and the URL derived before anything is
    /// awaited.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn_attempt(&self, element: Arc<ImageElement>) -> JoinHandle<LoadOutcome> {
        let url = self.derive_url(element.attributes());
        let guard = self.attempts.begin();
        let loader = self.clone();

        tokio::spawn(async move {
            let outcome = loader.run_attempt(&element, &url).await;
            loader.publish(&element, url, &outcome);
            drop(guard);
            outcome
        })
    }

    /// Returns the number of attempts that have not settled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.attempts.in_flight.load(Ordering::SeqCst)
    }

    /// Waits until every started attempt has settled.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.attempts.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    async fn run_attempt(&self, element: &ImageElement, url: &str) -> LoadOutcome {
        debug!(element = %element.id(), url, "Fetching image");

        match self.fetcher.fetch(url).await {
            Ok(image) => {
                trace!(
                    element = %element.id(),
                    width = image.width,
                    height = image.height,
                    "Image fetched"
                );
                self.swap(element, url).await
            }
            Err(_) => self.apply_fallback(element),
        }
    }

    async fn swap(&self, element: &ImageElement, url: &str) -> LoadOutcome {
        if url.is_empty() {
            return LoadOutcome::Skipped;
        }

        tokio::time::sleep(self.config.swap_delay()).await;
        element.set_displayed_source(url);
        debug!(element = %element.id(), url, "Swapped image source");
        LoadOutcome::Swapped(url.to_string())
    }

    fn apply_fallback(&self, element: &ImageElement) -> LoadOutcome {
        let fallback = element
            .attributes()
            .fallback()
            .or_else(|| self.config.fallback());

        match fallback {
            Some(fallback) => {
                element.set_displayed_source(fallback);
                debug!(element = %element.id(), fallback, "Applied fallback source");
                LoadOutcome::FellBack(fallback.to_string())
            }
            None => LoadOutcome::Unresolved,
        }
    }

    fn publish(&self, element: &ImageElement, url: String, outcome: &LoadOutcome) {
        if let Some(tx) = &self.event_tx {
            let event = LoadEvent {
                element: element.id().clone(),
                url,
                outcome: outcome.clone(),
            };
            let _ = tx.send(event);
        }
    }
}
