//! Final per-element report of a page run.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{ElementId, ImageElement, LoadEvent, LoadOutcome};

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Aligned plain text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// State of one element at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementReport {
    /// Element id.
    pub id: String,
    /// Declared base source.
    pub source: String,
    /// URL that was fetched, if the element became visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<String>,
    /// Outcome of the load attempt, if one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LoadOutcome>,
    /// Source displayed at the end of the run.
    pub displayed: Option<String>,
}

/// Summary of every element of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Elements in page order.
    pub elements: Vec<ElementReport>,
}

impl LoadReport {
    /// Builds a report from the elements and the events of their attempts.
    #[must_use]
    pub fn build(elements: &[Arc<ImageElement>], events: Vec<LoadEvent>) -> Self {
        let mut by_id: HashMap<ElementId, LoadEvent> = events
            .into_iter()
            .map(|event| (event.element.clone(), event))
            .collect();

        let elements = elements
            .iter()
            .map(|element| {
                let event = by_id.remove(element.id());
                ElementReport {
                    id: element.id().to_string(),
                    source: element.attributes().base_source().to_string(),
                    fetched: event.as_ref().map(|e| e.url.clone()),
                    outcome: event.map(|e| e.outcome),
                    displayed: element.displayed_source(),
                }
            })
            .collect();

        Self { elements }
    }

    /// Returns how many elements ended with each outcome label.
    #[must_use]
    pub fn counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for element in &self.elements {
            let label = element
                .outcome
                .as_ref()
                .map_or_else(|| "pending".to_string(), ToString::to_string);
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }
        counts
    }

    /// Renders the report.
    ///
    /// # Errors
    /// Returns error if JSON serialization fails.
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    fn render_text(&self) -> String {
        let id_width = self
            .elements
            .iter()
            .map(|e| e.id.len())
            .max()
            .unwrap_or(0)
            .max(2);

        let mut out = String::new();
        for element in &self.elements {
            let outcome = element
                .outcome
                .as_ref()
                .map_or_else(|| "pending".to_string(), ToString::to_string);
            let _ = writeln!(
                out,
                "{:<id_width$}  {:<10}  {}",
                element.id,
                outcome,
                element.displayed.as_deref().unwrap_or("-"),
            );
        }

        let summary: Vec<String> = self
            .counts()
            .into_iter()
            .map(|(label, n)| format!("{n} {label}"))
            .collect();
        let _ = writeln!(out, "{}", summary.join(", "));
        out
    }
}
