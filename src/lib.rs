//! lazyimg - Viewport-driven lazy image loading.
//!
//! Elements are attached with a placeholder, watched until they first
//! intersect the viewport, then fetched off-screen under a transformed URL
//! and swapped in after a short delay, or replaced by a fallback on failure.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the loading pipeline.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for runtime capabilities.
pub mod infrastructure;
/// Presentation layer containing report rendering.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "lazyimg";
