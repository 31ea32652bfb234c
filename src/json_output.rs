//! JSON output format for long-task reports

use crate::report::AttributedRow;
use serde::Serialize;

/// Versioned JSON report envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format identifier, always "atasco-json-v1"
    pub format: &'static str,
    /// Crate version that produced the report
    pub version: &'static str,
    /// Long-task threshold used for selection
    pub threshold_ms: f64,
    pub rows: Vec<AttributedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl JsonReport {
    pub fn new(threshold_ms: f64, rows: Vec<AttributedRow>, summary: Option<String>) -> Self {
        Self {
            format: "atasco-json-v1",
            version: env!("CARGO_PKG_VERSION"),
            threshold_ms,
            rows,
            summary,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
