//! CSV output format for long-task reports
//!
//! One row per reported task, for spreadsheet analysis and machine parsing.

use crate::report::AttributedRow;

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<AttributedRow>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report row to the output
    pub fn add_row(&mut self, row: AttributedRow) {
        self.rows.push(row);
    }

    fn header() -> &'static str {
        "url,group,start_ms,self_ms,duration_ms"
    }

    /// Generate the complete CSV document
    pub fn render(&self) -> String {
        let mut out = String::from(Self::header());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!(
                "{},{},{:.3},{:.3},{:.3}\n",
                escape_field(&row.url),
                escape_field(&row.group),
                row.start_ms,
                row.self_ms,
                row.duration_ms,
            ));
        }
        out
    }
}

impl FromIterator<AttributedRow> for CsvOutput {
    fn from_iter<I: IntoIterator<Item = AttributedRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Quote a field if it contains a comma, quote, or newline
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
