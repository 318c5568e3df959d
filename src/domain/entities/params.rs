//! Transformation parameters applied to a base source URL.

use serde::{Deserialize, Serialize};

/// Image output format a URL can be transformed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `WebP`, the default alternate format.
    #[default]
    WebP,
    /// AVIF.
    Avif,
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
}

impl OutputFormat {
    /// Every known format, in cache slot order.
    pub const ALL: [Self; 4] = [Self::WebP, Self::Avif, Self::Png, Self::Jpeg];

    /// Returns the stable slot of this format in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::WebP => 0,
            Self::Avif => 1,
            Self::Png => 2,
            Self::Jpeg => 3,
        }
    }

    /// Returns the lowercase name used in transformed URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A width and height pair. Dimensions are only ever applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Target width.
    pub width: u32,
    /// Target height.
    pub height: u32,
}

impl Dimension {
    /// Creates a new dimension pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Builds a dimension only when both halves are present.
    #[must_use]
    pub const fn from_parts(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(width), Some(height)) => Some(Self::new(width, height)),
            _ => None,
        }
    }
}

/// Parameters resolved for a single load attempt.
/// Absent parameters leave the URL untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformParams {
    /// Output format, present only when requested and supported.
    pub format: Option<OutputFormat>,
    /// Quality, 1..=100.
    pub quality: Option<u8>,
    /// Target dimensions.
    pub dimension: Option<Dimension>,
}

impl TransformParams {
    /// Returns true when no transformation would be applied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.format.is_none() && self.quality.is_none() && self.dimension.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_requires_both_parts() {
        assert_eq!(Dimension::from_parts(Some(100), None), None);
        assert_eq!(Dimension::from_parts(None, Some(50)), None);
        assert_eq!(
            Dimension::from_parts(Some(100), Some(50)),
            Some(Dimension::new(100, 50))
        );
    }

    #[test]
    fn test_format_slots_are_unique() {
        for (slot, format) in OutputFormat::ALL.iter().enumerate() {
            assert_eq!(format.index(), slot);
        }
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }

        let parsed: Wrapper = toml::from_str(r#"format = "avif""#).unwrap();
        assert_eq!(parsed.format, OutputFormat::Avif);
    }

    #[test]
    fn test_default_params_are_empty() {
        assert!(TransformParams::default().is_empty());
        let params = TransformParams {
            quality: Some(80),
            ..TransformParams::default()
        };
        assert!(!params.is_empty());
    }
}
