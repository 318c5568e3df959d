//! Application services.

mod loader;
mod param_resolver;
mod visibility_watcher;

pub use loader::ImageLoader;
pub use param_resolver::resolve_params;
pub use visibility_watcher::{VisibilityWatcher, WatchState};
