//! Lazily loaded image elements and their declared attributes.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::debug;

/// Identity of an observed element.
/// Either assigned by the host or derived from the element's position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub String);

impl ElementId {
    /// Creates a new `ElementId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ElementId` for the element at `index`, suffixed with a
    /// short hash of its base source for readability in logs.
    ///
    /// Two elements sharing a source still get distinct ids.
    #[must_use]
    pub fn positional(index: usize, src: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(src.as_bytes());
        let result = hasher.finalize();
        Self(format!("image-{index}-{}", hex::encode(&result[..4])))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Attributes declared on an element by the host.
/// Read-only for the whole lifetime of the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    /// Base source URL (`data-src`).
    pub src: Option<String>,
    /// Quality override (`data-quality`), 1..=100.
    pub quality: Option<u8>,
    /// Width override (`data-width`).
    pub width: Option<u32>,
    /// Height override (`data-height`).
    pub height: Option<u32>,
    /// Fallback source override (`data-err`).
    pub fallback: Option<String>,
}

impl ElementAttributes {
    /// Creates attributes with only a base source.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Sets the quality override.
    #[must_use]
    pub const fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Sets the width override.
    #[must_use]
    pub const fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the height override.
    #[must_use]
    pub const fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Sets the fallback source override.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Builds attributes from `data-*` key/value pairs.
    ///
    /// Keys are accepted with or without the `data-` prefix. Unknown keys are
    /// ignored; numeric values that do not parse are treated as absent.
    pub fn from_data_attributes<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attributes = Self::default();

        for (key, value) in pairs {
            let key = key.strip_prefix("data-").unwrap_or(key);
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "src" => attributes.src = Some(value.to_string()),
                "err" | "fallback" => attributes.fallback = Some(value.to_string()),
                "quality" => attributes.quality = parse_quality(value),
                "width" => attributes.width = parse_extent(key, value),
                "height" => attributes.height = parse_extent(key, value),
                _ => {}
            }
        }

        attributes
    }

    /// Returns the base source, or an empty string when none was declared.
    #[must_use]
    pub fn base_source(&self) -> &str {
        self.src.as_deref().unwrap_or("")
    }

    /// Returns the element-level fallback, ignoring empty values.
    #[must_use]
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref().filter(|f| !f.is_empty())
    }
}

fn parse_quality(value: &str) -> Option<u8> {
    let parsed = value.parse::<u8>().ok().filter(|q| (1..=100).contains(q));
    if parsed.is_none() {
        debug!(value, "Ignoring out-of-range quality attribute");
    }
    parsed
}

fn parse_extent(key: &str, value: &str) -> Option<u32> {
    let parsed = value.parse::<u32>().ok().filter(|v| *v > 0);
    if parsed.is_none() {
        debug!(key, value, "Ignoring unparseable dimension attribute");
    }
    parsed
}

/// An observed element whose visible source is filled in lazily.
///
/// The displayed source is the only mutable state. Writes to an element the
/// host has already discarded are harmless.
#[derive(Debug)]
pub struct ImageElement {
    id: ElementId,
    attributes: ElementAttributes,
    displayed: RwLock<Option<String>>,
    writes: AtomicUsize,
}

impl ImageElement {
    /// Creates a new element with nothing displayed.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, attributes: ElementAttributes) -> Self {
        Self {
            id: id.into(),
            attributes,
            displayed: RwLock::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the element identity.
    #[must_use]
    pub const fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns the declared attributes.
    #[must_use]
    pub const fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }

    /// Returns the currently displayed source.
    #[must_use]
    pub fn displayed_source(&self) -> Option<String> {
        self.displayed.read().clone()
    }

    /// Writes the visible source.
    pub fn set_displayed_source(&self, src: impl Into<String>) {
        *self.displayed.write() = Some(src.into());
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns how many times the visible source has been written.
    #[must_use]
    pub fn source_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_element_id() {
        let id = ElementId::positional(3, "img/a.jpg");
        assert!(id.as_str().starts_with("image-3-"));
        assert_eq!(id.as_str().len(), "image-3-".len() + 8);
        assert_eq!(id, ElementId::positional(3, "img/a.jpg"));
        assert_ne!(id, ElementId::positional(4, "img/a.jpg"));
    }

    #[test]
    fn test_from_data_attributes() {
        let attributes = ElementAttributes::from_data_attributes([
            ("data-src", "img/a.jpg"),
            ("data-quality", "75"),
            ("width", "320"),
            ("data-height", "240"),
            ("data-err", "img/broken.png"),
            ("data-unknown", "ignored"),
        ]);

        assert_eq!(attributes.src.as_deref(), Some("img/a.jpg"));
        assert_eq!(attributes.quality, Some(75));
        assert_eq!(attributes.width, Some(320));
        assert_eq!(attributes.height, Some(240));
        assert_eq!(attributes.fallback(), Some("img/broken.png"));
    }

    #[test]
    fn test_invalid_numeric_attributes_are_absent() {
        let attributes = ElementAttributes::from_data_attributes([
            ("data-src", "img/a.jpg"),
            ("data-quality", "250"),
            ("data-width", "wide"),
            ("data-height", "0"),
        ]);

        assert_eq!(attributes.quality, None);
        assert_eq!(attributes.width, None);
        assert_eq!(attributes.height, None);
    }

    #[test]
    fn test_missing_source_is_empty() {
        let attributes = ElementAttributes::default();
        assert_eq!(attributes.base_source(), "");
    }

    #[test]
    fn test_displayed_source_writes_are_counted() {
        let element = ImageElement::new("hero", ElementAttributes::new("img/a.jpg"));
        assert_eq!(element.displayed_source(), None);

        element.set_displayed_source("img/placeholder.png");
        element.set_displayed_source("img/a.jpg");

        assert_eq!(element.displayed_source().as_deref(), Some("img/a.jpg"));
        assert_eq!(element.source_writes(), 2);
    }
}
