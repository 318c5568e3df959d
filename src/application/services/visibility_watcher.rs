//! One-shot visibility detection per element.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::entities::ElementId;
use crate::domain::ports::{IntersectionEntry, IntersectionPort};

/// Lifecycle of a single watcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchState {
    /// Waiting for the first positive intersection.
    #[default]
    Pending,
    /// Fired once. Permanent.
    Triggered,
    /// Detached before firing. Permanent.
    Detached,
}

impl WatchState {
    /// Applies an intersection entry.
    /// Returns true exactly when this entry fires the watcher.
    pub fn on_entry(&mut self, entry: &IntersectionEntry) -> bool {
        if *self == Self::Pending && entry.is_intersecting {
            *self = Self::Triggered;
            return true;
        }
        false
    }

    /// Detaches a pending watcher. Returns true if the state changed.
    pub fn detach(&mut self) -> bool {
        if *self == Self::Pending {
            *self = Self::Detached;
            return true;
        }
        false
    }

    /// Returns true once no further entry can fire.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Watches one element and invokes a callback the first time it becomes
/// visible, then stops observing it.
///
/// When the runtime has no intersection support the callback runs
/// synchronously inside [`VisibilityWatcher::watch`]. A watcher is never
/// resumed; re-attaching an element creates a new one.
pub struct VisibilityWatcher {
    element: ElementId,
    state: Arc<Mutex<WatchState>>,
    port: Arc<dyn IntersectionPort>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for VisibilityWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityWatcher")
            .field("element", &self.element)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl VisibilityWatcher {
    /// Registers a one-shot visibility callback for `element`.
    ///
    /// # Panics
    /// Panics if observation is supported and this is called outside a tokio
    /// runtime.
    pub fn watch<F>(port: Arc<dyn IntersectionPort>, element: ElementId, on_visible: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(Mutex::new(WatchState::Pending));

        let stream = if port.is_supported() {
            port.observe(&element)
        } else {
            None
        };

        let Some(mut stream) = stream else {
            debug!(element = %element, "Intersection unavailable, treating element as visible");
            state.lock().on_entry(&IntersectionEntry::visible());
            on_visible();
            return Self {
                element,
                state,
                port,
                task: None,
            };
        };

        let task = tokio::spawn({
            let state = Arc::clone(&state);
            let port = Arc::clone(&port);
            let element = element.clone();
            async move {
                let fired = loop {
                    let Some(entry) = stream.recv().await else {
                        break false;
                    };
                    trace!(
                        element = %element,
                        intersecting = entry.is_intersecting,
                        ratio = entry.ratio,
                        "Intersection entry"
                    );
                    let fired = state.lock().on_entry(&entry);
                    if fired {
                        break true;
                    }
                    if state.lock().is_terminal() {
                        break false;
                    }
                };

                if fired {
                    port.unobserve(&element);
                    debug!(element = %element, "Element became visible");
                    on_visible();
                }
            }
        });

        Self {
            element,
            state,
            port,
            task: Some(task),
        }
    }

    /// Returns the watched element.
    #[must_use]
    pub const fn element(&self) -> &ElementId {
        &self.element
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> WatchState {
        *self.state.lock()
    }

    /// Stops watching. Safe to call any number of times, in any state.
    pub fn detach(&mut self) {
        let was_pending = self.state.lock().detach();
        if was_pending {
            self.port.unobserve(&self.element);
            debug!(element = %self.element, "Detached visibility watcher");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockIntersectionPort;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        (count, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_state_transitions() {
        let mut state = WatchState::default();
        assert!(!state.on_entry(&IntersectionEntry::hidden()));
        assert_eq!(state, WatchState::Pending);

        assert!(state.on_entry(&IntersectionEntry::visible()));
        assert_eq!(state, WatchState::Triggered);

        assert!(!state.on_entry(&IntersectionEntry::visible()));
        assert!(!state.detach());
        assert_eq!(state, WatchState::Triggered);
    }

    #[test]
    fn test_detached_state_never_fires() {
        let mut state = WatchState::Pending;
        assert!(state.detach());
        assert!(!state.detach());
        assert!(!state.on_entry(&IntersectionEntry::visible()));
        assert!(state.is_terminal());
    }

    #[tokio::test]
    async fn test_fires_once_for_repeated_entries() {
        let port = Arc::new(MockIntersectionPort::supported());
        let id = ElementId::new("hero");
        let (count, on_visible) = counter();

        let watcher = VisibilityWatcher::watch(port.clone(), id.clone(), on_visible);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        port.emit(&id, IntersectionEntry::hidden());
        port.emit(&id, IntersectionEntry::visible());
        port.emit(&id, IntersectionEntry::visible());
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.state(), WatchState::Triggered);
        assert_eq!(port.unobserve_count(&id), 1);
    }

    #[tokio::test]
    async fn test_non_intersecting_entries_do_not_fire() {
        let port = Arc::new(MockIntersectionPort::supported());
        let id = ElementId::new("footer");
        let (count, on_visible) = counter();

        let watcher = VisibilityWatcher::watch(port.clone(), id.clone(), on_visible);
        port.emit(&id, IntersectionEntry::hidden());
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.state(), WatchState::Pending);
    }

    #[tokio::test]
    async fn test_unsupported_runtime_fires_synchronously() {
        let port = Arc::new(MockIntersectionPort::unsupported());
        let id = ElementId::new("hero");
        let (count, on_visible) = counter();

        let watcher = VisibilityWatcher::watch(port.clone(), id.clone(), on_visible);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.state(), WatchState::Triggered);
        assert!(!port.is_observed(&id));
    }

    #[tokio::test]
    async fn test_detach_is_idempotent_and_blocks_firing() {
        let port = Arc::new(MockIntersectionPort::supported());
        let id = ElementId::new("hero");
        let (count, on_visible) = counter();

        let mut watcher = VisibilityWatcher::watch(port.clone(), id.clone(), on_visible);
        watcher.detach();
        watcher.detach();

        port.emit(&id, IntersectionEntry::visible());
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(watcher.state(), WatchState::Detached);
        assert_eq!(port.unobserve_count(&id), 1);
    }

    #[tokio::test]
    async fn test_detach_after_trigger_keeps_state() {
        let port = Arc::new(MockIntersectionPort::supported());
        let id = ElementId::new("hero");
        let (count, on_visible) = counter();

        let mut watcher = VisibilityWatcher::watch(port.clone(), id.clone(), on_visible);
        port.emit(&id, IntersectionEntry::visible());
        settle().await;
        watcher.detach();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.state(), WatchState::Triggered);
        assert_eq!(port.unobserve_count(&id), 1);
    }
}
