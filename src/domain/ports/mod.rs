mod format_probe_port;
mod image_fetch_port;
mod intersection_port;
mod url_transformer_port;

pub use format_probe_port::FormatProbePort;
pub use image_fetch_port::{FetchedImage, ImageFetchPort};
pub use intersection_port::{IntersectionEntry, IntersectionPort, IntersectionStream};
pub use url_transformer_port::UrlTransformerPort;
