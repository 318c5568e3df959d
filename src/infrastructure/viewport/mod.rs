//! Viewport intersection runtime.

pub mod tracker;

pub use tracker::{Span, ViewportTracker};
