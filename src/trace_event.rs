//! Chrome-style trace event model and parsing
//!
//! Accepts both trace file shapes emitted by Chromium-family tooling: a bare
//! JSON array of events, or an object wrapping the array in a `traceEvents`
//! field. Timestamps (`ts`) and durations (`dur`) are microseconds.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while turning raw trace bytes into a task forest
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to parse trace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Trace contains no complete events")]
    EmptyTrace,

    #[error("Invalid event nesting: '{name}' at {start_ms}ms overlaps its enclosing event without being contained by it")]
    InvalidNesting { name: String, start_ms: f64 },

    #[error("Invalid timing for '{name}': {detail}")]
    InvalidTiming { name: String, detail: String },

    #[error("Invalid task forest: {0}")]
    InvalidForest(String),
}

/// Result type for trace parsing and forest construction
pub type Result<T> = std::result::Result<T, TraceError>;

/// A single stack frame attached to an event's `args.data.stackTrace`;
/// only the frame URL matters for attribution
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackFrame {
    #[serde(default)]
    pub url: Option<String>,
}

/// The `args.data` payload carried by timeline events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceEventData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,
    #[serde(default, rename = "stackTrace")]
    pub stack_trace: Vec<StackFrame>,
}

/// Event arguments; only the fields the analyzer reads are modeled
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceEventArgs {
    #[serde(default)]
    pub data: Option<TraceEventData>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One trace event as recorded by the browser
#[derive(Debug, Clone, Deserialize)]
pub struct TraceEvent {
    pub name: String,
    pub ph: String,
    /// Start timestamp in microseconds
    pub ts: f64,
    /// Duration in microseconds; absent for instant/begin/end phases
    #[serde(default)]
    pub dur: Option<f64>,
    #[serde(default)]
    pub pid: u64,
    #[serde(default)]
    pub tid: u64,
    #[serde(default)]
    pub args: TraceEventArgs,
}

impl TraceEvent {
    /// Candidate attribution URLs carried by this event, in recorded order
    pub fn candidate_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        let mut push = |u: &Option<String>| {
            if let Some(u) = u {
                if !u.is_empty() && !urls.contains(u) {
                    urls.push(u.clone());
                }
            }
        };

        if let Some(data) = &self.args.data {
            push(&data.url);
            push(&data.file_name);
            for frame in &data.stack_trace {
                push(&frame.url);
            }
        }
        push(&self.args.url);

        urls
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTrace {
    Container {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<TraceEvent>,
    },
    Events(Vec<TraceEvent>),
}

/// Parse raw trace bytes into the flat event list
///
/// Accepts either `[...]` or `{"traceEvents": [...]}`. Event order is
/// preserved as recorded; the forest builder re-sorts by timestamp.
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<TraceEvent>> {
    let raw: RawTrace = serde_json::from_slice(bytes)?;
    let events = match raw {
        RawTrace::Container { trace_events } => trace_events,
        RawTrace::Events(events) => events,
    };
    tracing::debug!(count = events.len(), "parsed trace events");
    Ok(events)
}
