//! Infrastructure layer with adapters for the runtime capabilities.

/// Application configuration.
pub mod config;
/// Image handling (URL transformation, format probing, fetching).
pub mod image;
/// Viewport intersection tracking.
pub mod viewport;

pub use config::{
    AppConfig, CliArgs, ConfigStore, FetchConfig, LogLevel, ManifestError, PageManifest,
    StorageError, TransformConfig,
};
pub use image::{DecoderFormatProbe, HttpImageFetcher, QueryUrlTransformer};
pub use viewport::{Span, ViewportTracker};
