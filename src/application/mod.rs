//! Application layer with the lazy loading pipeline.

/// Loading, visibility and parameter services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{ImageLoader, VisibilityWatcher, WatchState, resolve_params};
pub use use_cases::LazyImageBinder;
