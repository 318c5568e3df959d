//! Process-wide lazy loading defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;

use super::params::OutputFormat;

/// Default delay between a successful fetch and the visible swap.
pub const DEFAULT_SWAP_DELAY_MS: u64 = 300;

/// Global configuration shared by every attached element.
/// Read-only once the loader has been built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyConfig {
    /// Source shown immediately on attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Request the alternate output format when the runtime can decode it.
    #[serde(default)]
    pub use_format: bool,

    /// Alternate output format requested by `use_format`.
    #[serde(default)]
    pub format: OutputFormat,

    /// Default quality, 1..=100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    /// Default width. Only applied together with `height`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Default height. Only applied together with `width`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Source shown when a fetch fails and the element has no own fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// Delay in milliseconds before a fetched image is swapped in.
    #[serde(default = "default_swap_delay_ms", alias = "timeout")]
    pub swap_delay_ms: u64,
}

const fn default_swap_delay_ms() -> u64 {
    DEFAULT_SWAP_DELAY_MS
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            placeholder: None,
            use_format: false,
            format: OutputFormat::default(),
            quality: None,
            width: None,
            height: None,
            fallback: None,
            swap_delay_ms: DEFAULT_SWAP_DELAY_MS,
        }
    }
}

impl LazyConfig {
    /// Returns the swap delay.
    #[must_use]
    pub const fn swap_delay(&self) -> Duration {
        Duration::from_millis(self.swap_delay_ms)
    }

    /// Returns the global fallback, ignoring empty values.
    #[must_use]
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref().filter(|f| !f.is_empty())
    }

    /// Returns the placeholder, ignoring empty values.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref().filter(|p| !p.is_empty())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns error if quality is outside 1..=100 or a dimension is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(quality) = self.quality {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::InvalidQuality { quality });
            }
        }

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if value == Some(0) {
                return Err(ConfigError::InvalidDimension { field });
            }
        }

        Ok(())
    }
}
