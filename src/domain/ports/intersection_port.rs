//! Port definition for viewport intersection detection.

use tokio::sync::mpsc;

use crate::domain::entities::ElementId;

/// A single intersection change for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Whether the element currently intersects the viewport.
    pub is_intersecting: bool,
    /// Visible fraction of the element, 0.0..=1.0.
    pub ratio: f32,
}

impl IntersectionEntry {
    /// Entry for a fully visible element.
    #[must_use]
    pub const fn visible() -> Self {
        Self {
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    /// Entry for an element outside the viewport.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            is_intersecting: false,
            ratio: 0.0,
        }
    }
}

/// Stream of intersection entries for one element.
pub type IntersectionStream = mpsc::UnboundedReceiver<IntersectionEntry>;

/// Port for observing viewport intersection.
pub trait IntersectionPort: Send + Sync {
    /// Returns false when the runtime has no intersection mechanism.
    fn is_supported(&self) -> bool;

    /// Starts observing an element.
    /// Returns None when observation is unavailable.
    fn observe(&self, element: &ElementId) -> Option<IntersectionStream>;

    /// Stops observing an element. Must be idempotent.
    fn unobserve(&self, element: &ElementId);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Mock intersection runtime driven by the test.
    ///
    /// Senders are kept after `unobserve` so tests can deliver late entries.
    pub struct MockIntersectionPort {
        supported: bool,
        senders: Mutex<HashMap<ElementId, mpsc::UnboundedSender<IntersectionEntry>>>,
        unobserved: Mutex<Vec<ElementId>>,
    }

    impl MockIntersectionPort {
        /// Creates a runtime with intersection support.
        pub fn supported() -> Self {
            Self {
                supported: true,
                senders: Mutex::new(HashMap::new()),
                unobserved: Mutex::new(Vec::new()),
            }
        }

        /// Creates a runtime without intersection support.
        pub fn unsupported() -> Self {
            Self {
                supported: false,
                ..Self::supported()
            }
        }

        /// Delivers an entry. Returns false if nobody is listening.
        pub fn emit(&self, element: &ElementId, entry: IntersectionEntry) -> bool {
            self.senders
                .lock()
                .get(element)
                .is_some_and(|tx| tx.send(entry).is_ok())
        }

        /// Returns true if `observe` was called for the element.
        pub fn is_observed(&self, element: &ElementId) -> bool {
            self.senders.lock().contains_key(element)
        }

        /// Returns how often `unobserve` was called for the element.
        pub fn unobserve_count(&self, element: &ElementId) -> usize {
            self.unobserved
                .lock()
                .iter()
                .filter(|id| *id == element)
                .count()
        }
    }

    impl IntersectionPort for MockIntersectionPort {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn observe(&self, element: &ElementId) -> Option<IntersectionStream> {
            if !self.supported {
                return None;
            }
            let (tx, rx) = mpsc::unbounded_channel();
            self.senders.lock().insert(element.clone(), tx);
            Some(rx)
        }

        fn unobserve(&self, element: &ElementId) {
            self.unobserved.lock().push(element.clone());
        }
    }
}
