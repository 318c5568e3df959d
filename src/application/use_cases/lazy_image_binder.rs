//! Per-element entry point for host frameworks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::application::services::{ImageLoader, VisibilityWatcher, WatchState};
use crate::domain::entities::{ElementId, ImageElement};
use crate::domain::ports::IntersectionPort;

/// Pending watchers keyed by element, each tagged with the attach that
/// created it.
#[derive(Default)]
struct WatcherRegistry {
    entries: Mutex<HashMap<ElementId, (u64, VisibilityWatcher)>>,
    next_token: AtomicU64,
    fired: Notify,
}

impl WatcherRegistry {
    /// Drops the watcher of `id` if it still belongs to the attach `token`.
    fn release(&self, id: &ElementId, token: u64) {
        let mut entries = self.entries.lock();
        if entries.get(id).is_some_and(|(current, _)| *current == token) {
            entries.remove(id);
        }
    }

    fn is_pending(&self, id: &ElementId) -> bool {
        self.entries
            .lock()
            .get(id)
            .is_some_and(|(_, watcher)| watcher.state() == WatchState::Pending)
    }
}

/// Binds elements to the lazy loading pipeline.
///
/// Holds the watcher of every element still waiting to become visible.
/// Attaching an element again detaches its previous watcher first; a watcher
/// that fires is released before its load starts.
pub struct LazyImageBinder {
    loader: ImageLoader,
    intersection: Arc<dyn IntersectionPort>,
    watchers: Arc<WatcherRegistry>,
}

impl std::fmt::Debug for LazyImageBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyImageBinder")
            .field("loader", &self.loader)
            .field("watchers", &self.attached_count())
            .finish_non_exhaustive()
    }
}

impl LazyImageBinder {
    /// Creates a new binder.
    #[must_use]
    pub fn new(loader: ImageLoader, intersection: Arc<dyn IntersectionPort>) -> Self {
        Self {
            loader,
            intersection,
            watchers: Arc::new(WatcherRegistry::default()),
        }
    }

    /// Returns the loader shared by every attached element.
    #[must_use]
    pub const fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Attaches an element.
    ///
    /// Shows the placeholder right away, then loads once the element becomes
    /// visible, or immediately when intersection observation is unavailable.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn attach(&self, element: Arc<ImageElement>) {
        if let Some(placeholder) = self.loader.config().placeholder() {
            element.set_displayed_source(placeholder);
        }

        let id = element.id().clone();
        self.detach(&id);

        if !self.intersection.is_supported() {
            debug!(element = %id, "Intersection unsupported, loading immediately");
            self.loader.load(element);
            return;
        }

        let token = self.watchers.next_token.fetch_add(1, Ordering::Relaxed);
        let on_visible = {
            let loader = self.loader.clone();
            let registry = Arc::downgrade(&self.watchers);
            let id = id.clone();
            move || fire(&registry, &id, token, &loader, element)
        };
        let watcher = VisibilityWatcher::watch(Arc::clone(&self.intersection), id.clone(), on_visible);

        // A watcher may fire before it is registered; only pending ones are kept.
        let mut entries = self.watchers.entries.lock();
        if watcher.state() == WatchState::Pending {
            debug!(element = %id, "Attached lazy image");
            entries.insert(id, (token, watcher));
        }
    }

    /// Rebind hook for hosts that re-run bindings when values change.
    /// Intentionally does nothing.
    pub fn update(&self, _element: &ImageElement) {}

    /// Detaches the watcher of an element.
    /// Returns true if the element was still waiting to become visible.
    pub fn detach(&self, id: &ElementId) -> bool {
        let prior = self.watchers.entries.lock().remove(id);
        match prior {
            Some((_, mut watcher)) => {
                watcher.detach();
                true
            }
            None => false,
        }
    }

    /// Returns the watcher state of an element still waiting to become
    /// visible.
    #[must_use]
    pub fn watch_state(&self, id: &ElementId) -> Option<WatchState> {
        self.watchers
            .entries
            .lock()
            .get(id)
            .map(|(_, watcher)| watcher.state())
    }

    /// Returns the number of elements waiting to become visible.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.watchers.entries.lock().len()
    }

    /// Waits until none of `ids` has a pending watcher.
    ///
    /// Call it with the elements an intersection entry was just delivered to;
    /// once it returns their load attempts have started.
    pub async fn wait_triggered(&self, ids: &[ElementId]) {
        loop {
            let fired = self.watchers.fired.notified();
            if !ids.iter().any(|id| self.watchers.is_pending(id)) {
                return;
            }
            fired.await;
        }
    }
}

fn fire(
    registry: &Weak<WatcherRegistry>,
    id: &ElementId,
    token: u64,
    loader: &ImageLoader,
    element: Arc<ImageElement>,
) {
    let registry = registry.upgrade();
    if let Some(registry) = &registry {
        registry.release(id, token);
    }

    loader.load(element);

    if let Some(registry) = &registry {
        registry.fired.notify_waiters();
    }
}
