//! Terminal outcomes of a load attempt.

use serde::Serialize;

use super::element::ElementId;

/// How a single load attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Fetch succeeded and the derived URL was swapped in after the delay.
    Swapped(String),
    /// Fetch failed and a fallback source was written.
    FellBack(String),
    /// Fetch failed and no fallback was configured. Nothing was written.
    Unresolved,
    /// Fetch succeeded but the derived URL was empty. Nothing was written.
    Skipped,
}

impl LoadOutcome {
    /// Returns the source written to the element, if any.
    #[must_use]
    pub fn written_source(&self) -> Option<&str> {
        match self {
            Self::Swapped(src) | Self::FellBack(src) => Some(src),
            Self::Unresolved | Self::Skipped => None,
        }
    }

    /// Returns true if the derived URL was displayed.
    #[must_use]
    pub const fn is_swapped(&self) -> bool {
        matches!(self, Self::Swapped(_))
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Swapped(_) => write!(f, "swapped"),
            Self::FellBack(_) => write!(f, "fallback"),
            Self::Unresolved => write!(f, "unresolved"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Message sent when a load attempt settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    /// The element the attempt belonged to.
    pub element: ElementId,
    /// The derived URL that was fetched.
    pub url: String,
    /// Terminal outcome.
    pub outcome: LoadOutcome,
}
