//! Merges element overrides over global defaults.

use crate::domain::entities::{Dimension, ElementAttributes, LazyConfig, TransformParams};
use crate::domain::ports::FormatProbePort;

/// Resolves the parameters for one load attempt.
///
/// Element values win over global ones. Dimensions are taken as a pair from
/// one level: the element's if it declares both halves, otherwise the global
/// pair. Halves from different levels are never combined. The probe is only
/// consulted when the alternate format is requested.
#[must_use]
pub fn resolve_params(
    attributes: &ElementAttributes,
    config: &LazyConfig,
    probe: &dyn FormatProbePort,
) -> TransformParams {
    let format = (config.use_format && probe.supports(config.format)).then_some(config.format);

    let quality = attributes.quality.or(config.quality);

    let dimension = Dimension::from_parts(attributes.width, attributes.height)
        .or_else(|| Dimension::from_parts(config.width, config.height));

    TransformParams {
        format,
        quality,
        dimension,
    }
}
