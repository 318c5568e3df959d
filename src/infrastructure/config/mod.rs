//! Application configuration.

pub mod app_config;
pub mod args;
pub mod manifest;
pub mod storage;

pub use app_config::{AppConfig, FetchConfig, LogLevel, TransformConfig};
pub use args::CliArgs;
pub use manifest::{ImageSpec, ManifestError, PageManifest};
pub use storage::{ConfigLocation, ConfigStore, StorageError};
