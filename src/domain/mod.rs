//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ElementAttributes, ElementId, ImageElement, LazyConfig};
pub use errors::{ConfigError, FetchError};
pub use ports::{FormatProbePort, ImageFetchPort, IntersectionPort, UrlTransformerPort};
