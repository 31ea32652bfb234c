//! Task blame attribution
//!
//! Resolves a single causing identity for each long task through a layered
//! fallback: a URL confirmed to be script code, then a best-guess URL from
//! the task's call stack, then a fixed taxonomy of browser-internal buckets
//! keyed by the originating event name.
//!
//! A meaningful fraction of main-thread time is never attributable to page
//! script; the browser and GC buckets keep that time from being lumped into
//! the unattributable sentinel.

use crate::task_forest::Task;
use std::collections::HashSet;

/// Event names that are pure browser overhead
pub const BROWSER_EVENT_NAMES: &[&str] = &["CpuProfiler::StartProfiling"];

/// Event names that are garbage collection work
pub const GC_EVENT_NAMES: &[&str] = &["V8.GCCompactor", "MajorGC", "MinorGC"];

/// Label for browser-internal overhead work
pub const BROWSER_LABEL: &str = "Browser";

/// Label for garbage collection work
pub const BROWSER_GC_LABEL: &str = "Browser GC";

/// Label when no cause can be determined
pub const UNATTRIBUTABLE_LABEL: &str = "Unattributable";

/// Placeholder page URL that carries no attribution value
pub const BLANK_PAGE_URL: &str = "about:blank";

/// Resolve the causing identity for one task
///
/// Precedence:
/// 1. the first candidate URL confirmed to be a script resource;
/// 2. the first candidate URL, confirmed or not;
/// 3. if no candidate exists, or the chosen candidate is `about:blank`,
///    classify by event name: browser overhead, GC, or unattributable.
///
/// Pure function of `(task, script_urls)`.
pub fn attributable_url(task: &Task, script_urls: &HashSet<String>) -> String {
    let chosen = task
        .attributable_urls
        .iter()
        .find(|url| script_urls.contains(*url))
        .or_else(|| task.attributable_urls.first());

    match chosen {
        Some(url) if url.as_str() != BLANK_PAGE_URL => url.clone(),
        _ => classify_event_name(&task.event_name).to_string(),
    }
}

fn classify_event_name(event_name: &str) -> &'static str {
    if BROWSER_EVENT_NAMES.contains(&event_name) {
        BROWSER_LABEL
    } else if GC_EVENT_NAMES.contains(&event_name) {
        BROWSER_GC_LABEL
    } else {
        UNATTRIBUTABLE_LABEL
    }
}
