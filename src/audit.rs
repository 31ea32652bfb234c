//! Long-task audit pipeline
//!
//! Composition layer tying the stages together: acquire the task forest and
//! network records (through the artifact cache), select the long tasks,
//! attribute each one, and assemble the report. Metadata and rendering live
//! with the caller; the selection and attribution stages stay pure.

use crate::cache::{ArtifactCache, ArtifactKey, TraceId};
use crate::network::{self, NetworkRecord};
use crate::report::{assemble_rows, summary_phrase, AttributedRow};
use crate::selector::{select_long_tasks, DEFAULT_LONG_TASK_THRESHOLD_MS, MAX_REPORTED_TASKS};
use crate::task_forest::TaskForest;
use crate::trace_event::parse_trace;
use anyhow::{Context, Result};
use std::collections::HashSet;

const FOREST_ARTIFACT: &str = "task-forest";
const RECORDS_ARTIFACT: &str = "network-records";

/// Audit configuration
#[derive(Debug, Clone, Copy)]
pub struct AuditConfig {
    /// Minimum duration for a task to count as long, in milliseconds
    pub threshold_ms: f64,
    /// Maximum number of reported rows
    pub max_tasks: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            threshold_ms: DEFAULT_LONG_TASK_THRESHOLD_MS,
            max_tasks: MAX_REPORTED_TASKS,
        }
    }
}

/// The audit's output: attributed rows plus the pluralized summary
///
/// Zero rows is a valid outcome, not an error; `summary` is `None` in that
/// case and the consumer treats the diagnostic as not applicable.
#[derive(Debug, Clone)]
pub struct LongTaskReport {
    pub rows: Vec<AttributedRow>,
    pub summary: Option<String>,
    pub threshold_ms: f64,
}

impl LongTaskReport {
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Long-task audit runner
///
/// Holds the configuration and the per-trace artifact caches, so running
/// the audit twice over the same input bytes re-parses nothing.
#[derive(Debug, Default)]
pub struct LongTaskAudit {
    config: AuditConfig,
    forests: ArtifactCache<TaskForest>,
    records: ArtifactCache<Vec<NetworkRecord>>,
}

impl LongTaskAudit {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            forests: ArtifactCache::new(),
            records: ArtifactCache::new(),
        }
    }

    /// Run the audit over raw trace bytes and optional network record bytes
    ///
    /// Without network records the script-URL set is empty and attribution
    /// falls back to best-guess URLs and event-name buckets.
    pub fn run(
        &mut self,
        trace_bytes: &[u8],
        network_bytes: Option<&[u8]>,
    ) -> Result<LongTaskReport> {
        let forest_key = ArtifactKey::new(FOREST_ARTIFACT, TraceId::from_bytes(trace_bytes));
        let forest = self
            .forests
            .get_or_insert_with(forest_key, || -> Result<TaskForest> {
                let events = parse_trace(trace_bytes).context("failed to parse trace")?;
                TaskForest::from_events(&events).context("failed to build task forest")
            })?;

        let known_script_urls: HashSet<String> = match network_bytes {
            Some(bytes) => {
                let key = ArtifactKey::new(RECORDS_ARTIFACT, TraceId::from_bytes(bytes));
                let records = self
                    .records
                    .get_or_insert_with(key, || -> Result<Vec<NetworkRecord>> {
                        network::parse_network_records(bytes)
                            .context("failed to parse network records")
                    })?;
                network::script_urls(records)
            }
            None => HashSet::new(),
        };

        let selected = select_long_tasks(forest, self.config.threshold_ms, self.config.max_tasks);
        let rows = assemble_rows(forest, &selected, &known_script_urls);
        let summary = summary_phrase(rows.len());

        Ok(LongTaskReport {
            summary,
            threshold_ms: self.config.threshold_ms,
            rows,
        })
    }
}
