//! Domain entity definitions.

mod element;
mod lazy_config;
mod load_outcome;
mod params;

pub use element::{ElementAttributes, ElementId, ImageElement};
pub use lazy_config::{DEFAULT_SWAP_DELAY_MS, LazyConfig};
pub use load_outcome::{LoadEvent, LoadOutcome};
pub use params::{Dimension, OutputFormat, TransformParams};
