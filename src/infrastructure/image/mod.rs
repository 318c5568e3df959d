//! Image handling infrastructure.
//!
//! This module provides:
//! - Query-string URL transformation
//! - Decoder-backed format support detection
//! - Off-screen fetching over HTTP or from disk

pub mod format_probe;
pub mod http_fetcher;
pub mod query_transformer;

pub use format_probe::{DecoderFormatProbe, decoder_available};
pub use http_fetcher::{FetcherError, HttpImageFetcher, SourceLocation, directory_url};
pub use query_transformer::{QueryUrlTransformer, host_of, set_query_param};
