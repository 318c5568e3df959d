//! Presentation layer with report rendering.

/// Run reports.
pub mod report;

pub use report::{ElementReport, LoadReport, ReportFormat};
