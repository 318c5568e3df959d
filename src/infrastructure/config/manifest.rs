//! Page manifests: the image elements of a page and how it is scrolled.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::entities::{ElementAttributes, ElementId, ImageElement};
use crate::infrastructure::viewport::Span;

/// Errors reading a page manifest.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate element id: {0}")]
    DuplicateId(String),
}

/// A page laid out as a vertical column of image elements.
///
/// ```toml
/// viewport_height = 800
/// scroll = [0, 900, 1800]
///
/// [[image]]
/// id = "hero"
/// top = 0
/// height = 400
/// data = { src = "img/hero.jpg", quality = "80", err = "img/broken.png" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PageManifest {
    /// Visible height of the page.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Extra margin around the viewport that already counts as visible.
    #[serde(default)]
    pub root_margin: u32,

    /// Scroll offsets visited in order after every element is attached.
    #[serde(default)]
    pub scroll: Vec<u32>,

    /// Image elements.
    #[serde(default, rename = "image")]
    pub images: Vec<ImageSpec>,
}

/// One image element of a page.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSpec {
    /// Element id. Derived from the element's position when omitted.
    #[serde(default)]
    pub id: Option<String>,

    /// Offset of the element from the top of the page.
    #[serde(default)]
    pub top: u32,

    /// Element height.
    #[serde(default = "default_image_height")]
    pub height: u32,

    /// `data-*` attributes as declared on the element.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

const fn default_viewport_height() -> u32 {
    800
}

const fn default_image_height() -> u32 {
    200
}

impl ImageSpec {
    /// Returns the declared attributes.
    #[must_use]
    pub fn attributes(&self) -> ElementAttributes {
        ElementAttributes::from_data_attributes(
            self.data.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    /// Returns the element id of the image at `index` on its page.
    #[must_use]
    pub fn element_id(&self, index: usize) -> ElementId {
        self.id.as_deref().filter(|id| !id.is_empty()).map_or_else(
            || ElementId::positional(index, self.attributes().base_source()),
            ElementId::new,
        )
    }

    /// Returns the vertical extent.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.top, self.height)
    }
}

impl PageManifest {
    /// Loads a manifest from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a manifest from TOML.
    ///
    /// # Errors
    /// Returns error if the content is not a valid manifest.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the elements of the page with their spans.
    ///
    /// Images without an id are identified by position, so only ids written
    /// in the manifest can collide.
    ///
    /// # Errors
    /// Returns error if two elements share an id.
    pub fn elements(&self) -> Result<Vec<(Arc<ImageElement>, Span)>, ManifestError> {
        let mut seen = HashSet::new();
        let mut elements = Vec::with_capacity(self.images.len());

        for (index, spec) in self.images.iter().enumerate() {
            let id = spec.element_id(index);
            if !seen.insert(id.clone()) {
                return Err(ManifestError::DuplicateId(id.to_string()));
            }
            elements.push((Arc::new(ImageElement::new(id, spec.attributes())), spec.span()));
        }

        Ok(elements)
    }
}
