//! Decoder-backed image format support detection.

use std::sync::{Arc, LazyLock, OnceLock};

use tracing::debug;

use crate::domain::entities::OutputFormat;
use crate::domain::ports::FormatProbePort;

type FormatTest = Box<dyn Fn(OutputFormat) -> bool + Send + Sync>;

static SHARED: LazyLock<Arc<DecoderFormatProbe>> =
    LazyLock::new(|| Arc::new(DecoderFormatProbe::new()));

/// Answers format support once per format and remembers the answer.
///
/// Use [`DecoderFormatProbe::shared`] for the process-wide instance. There is
/// no way to invalidate a cached answer.
pub struct DecoderFormatProbe {
    test: FormatTest,
    answers: [OnceLock<bool>; OutputFormat::ALL.len()],
}

impl std::fmt::Debug for DecoderFormatProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderFormatProbe")
            .field("answers", &self.answers)
            .finish_non_exhaustive()
    }
}

impl Default for DecoderFormatProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderFormatProbe {
    /// Creates a probe that checks the compiled-in image decoders.
    #[must_use]
    pub fn new() -> Self {
        Self::with_test(decoder_available)
    }

    /// Creates a probe with a custom synchronous feature test.
    #[must_use]
    pub fn with_test(test: impl Fn(OutputFormat) -> bool + Send + Sync + 'static) -> Self {
        Self {
            test: Box::new(test),
            answers: Default::default(),
        }
    }

    /// Returns the process-wide probe.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }
}

impl FormatProbePort for DecoderFormatProbe {
    fn supports(&self, format: OutputFormat) -> bool {
        *self.answers[format.index()].get_or_init(|| {
            let supported = (self.test)(format);
            debug!(format = %format, supported, "Probed image format support");
            supported
        })
    }
}

/// Returns true if the `image` crate was built with a decoder for `format`.
#[must_use]
pub fn decoder_available(format: OutputFormat) -> bool {
    let format = match format {
        OutputFormat::WebP => image::ImageFormat::WebP,
        OutputFormat::Avif => image::ImageFormat::Avif,
        OutputFormat::Png => image::ImageFormat::Png,
        OutputFormat::Jpeg => image::ImageFormat::Jpeg,
    };
    format.reading_enabled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_answer_is_computed_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let probe = DecoderFormatProbe::with_test(move |format| {
            counted.fetch_add(1, Ordering::SeqCst);
            format == OutputFormat::WebP
        });

        for _ in 0..10 {
            assert!(probe.supports(OutputFormat::WebP));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(!probe.supports(OutputFormat::Avif));
        assert!(!probe.supports(OutputFormat::Avif));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compiled_decoders() {
        assert!(decoder_available(OutputFormat::WebP));
        assert!(decoder_available(OutputFormat::Png));
        assert!(decoder_available(OutputFormat::Jpeg));
        assert!(!decoder_available(OutputFormat::Avif));
    }

    #[test]
    fn test_shared_probe_is_single_instance() {
        let first = DecoderFormatProbe::shared();
        let second = DecoderFormatProbe::shared();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            first.supports(OutputFormat::WebP),
            second.supports(OutputFormat::WebP)
        );
    }
}
