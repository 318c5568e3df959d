//! Port definition for image format support detection.

use crate::domain::entities::OutputFormat;

/// Port answering whether the runtime can decode a format.
/// Answers must not change for the lifetime of the process.
#[cfg_attr(test, mockall::automock)]
pub trait FormatProbePort: Send + Sync {
    /// Returns true if images in `format` can be decoded.
    fn supports(&self, format: OutputFormat) -> bool;
}
