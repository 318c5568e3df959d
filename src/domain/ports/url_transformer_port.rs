//! Port definition for source URL transformation.

use crate::domain::entities::{Dimension, OutputFormat, TransformParams};

/// Port for deriving a fetch URL from a base source.
///
/// Implementations supply the individual stages in whatever syntax the image
/// host understands. Stages must be pure.
pub trait UrlTransformerPort: Send + Sync {
    /// Requests a different output format.
    fn with_format(&self, url: &str, format: OutputFormat) -> String;

    /// Requests a quality level.
    fn with_quality(&self, url: &str, quality: u8) -> String;

    /// Requests target dimensions.
    fn with_dimension(&self, url: &str, dimension: Dimension) -> String;

    /// Derives the final URL by applying format, quality and dimension in
    /// that order. Absent parameters are skipped and an empty base source is
    /// returned unchanged.
    fn derive_url(&self, url: &str, params: &TransformParams) -> String {
        if url.is_empty() {
            return String::new();
        }

        let mut derived = url.to_string();
        if let Some(format) = params.format {
            derived = self.with_format(&derived, format);
        }
        if let Some(quality) = params.quality {
            derived = self.with_quality(&derived, quality);
        }
        if let Some(dimension) = params.dimension {
            derived = self.with_dimension(&derived, dimension);
        }
        derived
    }
}


#[cfg(test)]
mod tests {
    use super::mock::TaggingTransformer;
    use super::*;

    #[test]
    fn test_empty_params_return_base() {
        let transformer = TaggingTransformer;
        let derived = transformer.derive_url("img/a.jpg", &TransformParams::default());
        assert_eq!(derived, "img/a.jpg");
    }

    #[test]
    fn test_empty_base_is_not_transformed() {
        let transformer = TaggingTransformer;
        let params = TransformParams {
            format: Some(OutputFormat::WebP),
            quality: Some(80),
            dimension: Some(Dimension::new(10, 10)),
        };
        assert_eq!(transformer.derive_url("", &params), "");
    }

    #[test]
    fn test_stages_apply_in_fixed_order() {
        let transformer = TaggingTransformer;
        let params = TransformParams {
            format: Some(OutputFormat::WebP),
            quality: Some(80),
            dimension: Some(Dimension::new(100, 50)),
        };
        assert_eq!(
            transformer.derive_url("img/a.jpg", &params),
            "img/a.jpg|f=webp|q=80|d=100x50"
        );
    }

    #[test]
    fn test_absent_stage_is_identity() {
        let transformer = TaggingTransformer;
        let params = TransformParams {
            format: Some(OutputFormat::WebP),
            quality: None,
            dimension: Some(Dimension::new(100, 50)),
        };
        let composed = transformer.with_dimension(
            &transformer.with_format("img/a.jpg", OutputFormat::WebP),
            Dimension::new(100, 50),
        );
        assert_eq!(transformer.derive_url("img/a.jpg", &params), composed);
    }
}
