//! Configuration value errors.

use thiserror::Error;

/// Invalid lazy loading configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("quality must be between 1 and 100, got {quality}")]
    InvalidQuality { quality: u8 },

    #[error("{field} must be greater than zero")]
    InvalidDimension { field: &'static str },
}
