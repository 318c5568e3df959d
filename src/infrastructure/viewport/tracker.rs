//! Scroll-model intersection runtime.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::entities::ElementId;
use crate::domain::ports::{IntersectionEntry, IntersectionPort, IntersectionStream};

/// Vertical extent of an element in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Offset of the top edge from the top of the page.
    pub top: u32,
    /// Element height.
    pub height: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(top: u32, height: u32) -> Self {
        Self { top, height }
    }

    const fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

struct Observer {
    tx: mpsc::UnboundedSender<IntersectionEntry>,
    intersecting: bool,
}

struct TrackerState {
    offset: u32,
    viewport_height: u32,
    root_margin: u32,
    spans: HashMap<ElementId, Span>,
    observers: HashMap<ElementId, Observer>,
}

impl TrackerState {
    /// Computes the entry of an element against the current viewport,
    /// expanded by the root margin on both edges.
    #[allow(clippy::cast_precision_loss)]
    fn entry_for(&self, id: &ElementId) -> IntersectionEntry {
        let Some(span) = self.spans.get(id).copied() else {
            return IntersectionEntry::hidden();
        };

        let start = self.offset.saturating_sub(self.root_margin);
        let end = self
            .offset
            .saturating_add(self.viewport_height)
            .saturating_add(self.root_margin);

        if span.height == 0 {
            let inside = span.top >= start && span.top <= end;
            return if inside {
                IntersectionEntry::visible()
            } else {
                IntersectionEntry::hidden()
            };
        }

        let overlap = span.bottom().min(end).saturating_sub(span.top.max(start));
        if overlap == 0 {
            return IntersectionEntry::hidden();
        }

        IntersectionEntry {
            is_intersecting: true,
            ratio: (overlap as f32 / span.height as f32).min(1.0),
        }
    }

    /// Sends an entry to every observer whose intersection state changed.
    fn notify_changes(&mut self) {
        let entries: Vec<(ElementId, IntersectionEntry)> = self
            .observers
            .iter()
            .filter_map(|(id, observer)| {
                let entry = self.entry_for(id);
                (entry.is_intersecting != observer.intersecting).then(|| (id.clone(), entry))
            })
            .collect();

        for (id, entry) in entries {
            let delivered = self
                .observers
                .get(&id)
                .is_some_and(|observer| observer.tx.send(entry).is_ok());

            if delivered {
                trace!(element = %id, intersecting = entry.is_intersecting, "Delivered intersection entry");
                if let Some(observer) = self.observers.get_mut(&id) {
                    observer.intersecting = entry.is_intersecting;
                }
            } else {
                self.observers.remove(&id);
            }
        }
    }
}

/// Intersection runtime for a vertically scrolling page.
///
/// Like a browser intersection observer it delivers one entry when an element
/// starts being observed and another on every change of its intersecting
/// state while the viewport scrolls or elements move.
pub struct ViewportTracker {
    supported: bool,
    state: Mutex<TrackerState>,
}

impl std::fmt::Debug for ViewportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ViewportTracker")
            .field("supported", &self.supported)
            .field("offset", &state.offset)
            .field("viewport_height", &state.viewport_height)
            .field("observed", &state.observers.len())
            .finish_non_exhaustive()
    }
}

impl ViewportTracker {
    /// Creates a tracker for a viewport of the given height.
    #[must_use]
    pub fn new(viewport_height: u32) -> Self {
        Self {
            supported: true,
            state: Mutex::new(TrackerState {
                offset: 0,
                viewport_height,
                root_margin: 0,
                spans: HashMap::new(),
                observers: HashMap::new(),
            }),
        }
    }

    /// Creates a tracker that reports intersection as unavailable.
    #[must_use]
    pub fn unsupported(viewport_height: u32) -> Self {
        Self {
            supported: false,
            ..Self::new(viewport_height)
        }
    }

    /// Grows the viewport by `margin` on both edges, so elements are reported
    /// shortly before they scroll into view.
    #[must_use]
    pub fn with_root_margin(self, margin: u32) -> Self {
        self.state.lock().root_margin = margin;
        self
    }

    /// Places or moves an element.
    pub fn place(&self, id: ElementId, span: Span) {
        let mut state = self.state.lock();
        state.spans.insert(id, span);
        state.notify_changes();
    }

    /// Scrolls the viewport to `offset`.
    pub fn scroll_to(&self, offset: u32) {
        let mut state = self.state.lock();
        state.offset = offset;
        state.notify_changes();
    }

    /// Returns the current scroll offset.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.state.lock().offset
    }

    /// Returns the observed elements whose latest entry was intersecting.
    #[must_use]
    pub fn intersecting(&self) -> Vec<ElementId> {
        self.state
            .lock()
            .observers
            .iter()
            .filter(|(_, observer)| observer.intersecting)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Returns the number of observed elements.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.state.lock().observers.len()
    }
}

impl IntersectionPort for ViewportTracker {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn observe(&self, element: &ElementId) -> Option<IntersectionStream> {
        if !self.supported {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let entry = state.entry_for(element);
        let _ = tx.send(entry);
        state.observers.insert(
            element.clone(),
            Observer {
                tx,
                intersecting: entry.is_intersecting,
            },
        );
        Some(rx)
    }

    fn unobserve(&self, element: &ElementId) {
        self.state.lock().observers.remove(element);
    }
}
