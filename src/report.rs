//! Attributed report rows and text rendering
//!
//! Assembles one row per selected task: the resolved blame URL plus the
//! task's group label and timing, in selection order. Rows are constructed
//! fresh per analysis call and never retained.

use crate::attribution::attributable_url;
use crate::task_forest::{TaskForest, TaskId};
use serde::Serialize;
use std::collections::HashSet;

/// One reported long task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributedRow {
    /// Resolved causing identity: script URL, best-guess URL, or bucket label
    pub url: String,
    /// Work group label (e.g. "Script Evaluation")
    pub group: String,
    pub start_ms: f64,
    pub self_ms: f64,
    pub duration_ms: f64,
}

/// Build report rows for the selected tasks, preserving selection order
pub fn assemble_rows(
    forest: &TaskForest,
    selected: &[TaskId],
    known_script_urls: &HashSet<String>,
) -> Vec<AttributedRow> {
    selected
        .iter()
        .map(|&id| {
            let task = forest.get(id);
            AttributedRow {
                url: attributable_url(task, known_script_urls),
                group: task.group.label().to_string(),
                start_ms: task.start_time,
                self_ms: task.self_time,
                duration_ms: task.duration,
            }
        })
        .collect()
}

/// Pluralized summary phrase for the row count; `None` when nothing was found
pub fn summary_phrase(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 long task found".to_string()),
        n => Some(format!("{} long tasks found", n)),
    }
}

/// Render rows as an aligned text table
pub fn render_table(rows: &[AttributedRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let url_width = rows
        .iter()
        .map(|r| r.url.len())
        .chain(std::iter::once("URL".len()))
        .max()
        .unwrap_or(3);
    let group_width = rows
        .iter()
        .map(|r| r.group.len())
        .chain(std::iter::once("Group".len()))
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<url_width$}  {:<group_width$}  {:>10}  {:>10}  {:>10}\n",
        "URL", "Group", "Start", "Self", "Duration",
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<url_width$}  {:<group_width$}  {:>8.1}ms  {:>8.1}ms  {:>8.1}ms\n",
            row.url, row.group, row.start_ms, row.self_ms, row.duration_ms,
        ));
    }
    out
}
