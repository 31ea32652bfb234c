//! Main-thread task forest construction
//!
//! Turns the flat trace event list into a forest of `Task` records: events
//! are nested by timestamp containment, self-time is the duration not
//! covered by children, and tasks whose end was never observed inside the
//! trace window are flagged unbounded.
//!
//! Invariants are validated once at this boundary, via [`TaskForest::from_tasks`];
//! downstream selection and attribution assume a well-formed forest.

use crate::trace_event::{Result, TraceError, TraceEvent};

/// Index of a task in its forest's arena
///
/// Arena order is forest traversal order: parents precede their children,
/// siblings are ordered by start time. Selection relies on this for its
/// deterministic equal-duration tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

/// Top-level scheduler event names that mark a renderer main thread
pub const TOP_LEVEL_EVENT_NAMES: &[&str] = &[
    "RunTask",
    "ThreadControllerImpl::RunTask",
    "ThreadControllerImpl::DoWork",
    "TaskQueueManager::ProcessTaskFromWorkQueue",
];

/// Timestamp comparison tolerance in milliseconds (1 microsecond)
const TIME_EPSILON_MS: f64 = 0.001;

/// Kind of main-thread work a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskGroup {
    ParseHtml,
    StyleLayout,
    PaintCompositeRender,
    ScriptParseCompile,
    ScriptEvaluation,
    GarbageCollection,
    Other,
}

impl TaskGroup {
    /// Stable human-readable label used in report rows
    pub fn label(&self) -> &'static str {
        match self {
            TaskGroup::ParseHtml => "Parse HTML & CSS",
            TaskGroup::StyleLayout => "Style & Layout",
            TaskGroup::PaintCompositeRender => "Rendering",
            TaskGroup::ScriptParseCompile => "Script Parsing & Compilation",
            TaskGroup::ScriptEvaluation => "Script Evaluation",
            TaskGroup::GarbageCollection => "Garbage Collection",
            TaskGroup::Other => "Other",
        }
    }

    /// Classify a timeline event name into its work group
    pub fn from_event_name(name: &str) -> Self {
        match name {
            "ParseHTML" | "ParseAuthorStyleSheet" => TaskGroup::ParseHtml,
            "ScheduleStyleRecalculation"
            | "UpdateLayoutTree"
            | "RecalculateStyles"
            | "InvalidateLayout"
            | "Layout" => TaskGroup::StyleLayout,
            "Paint" | "PaintImage" | "RasterTask" | "CompositeLayers" | "UpdateLayer"
            | "UpdateLayerTree" | "Decode Image" => TaskGroup::PaintCompositeRender,
            "v8.compile" | "V8.CompileScript" | "v8.parseOnBackground" => {
                TaskGroup::ScriptParseCompile
            }
            "EvaluateScript" | "FunctionCall" | "TimerFire" | "EventDispatch"
            | "RunMicrotasks" | "V8.Execute" | "XHRReadyStateChange" | "XHRLoad" => {
                TaskGroup::ScriptEvaluation
            }
            "MinorGC" | "MajorGC" | "V8.GCCompactor" | "BlinkGC.AtomicPhase"
            | "V8.GCFinalizeMC" | "V8.GCScavenger" => TaskGroup::GarbageCollection,
            _ => TaskGroup::Other,
        }
    }
}

/// One unit of main-thread work
///
/// `duration` includes all nested work; `self_time` is the remainder once
/// children are subtracted. Times are milliseconds relative to the first
/// main-thread task.
#[derive(Debug, Clone)]
pub struct Task {
    /// Originating low-level event name (used by attribution fallback)
    pub event_name: String,
    pub group: TaskGroup,
    pub start_time: f64,
    pub duration: f64,
    pub self_time: f64,
    pub parent: Option<TaskId>,
    pub children: Vec<TaskId>,
    /// End was not observed inside the trace capture window
    pub unbounded: bool,
    /// Candidate blame URLs, first-seen order, descendants folded in
    pub attributable_urls: Vec<String>,
}

impl Task {
    fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// The main-thread task forest for one trace
#[derive(Debug, Clone, Default)]
pub struct TaskForest {
    tasks: Vec<Task>,
}

impl TaskForest {
    /// Build the forest directly from already-constructed tasks
    ///
    /// This is the invariant boundary: times must be non-negative,
    /// `self_time` must not exceed `duration`, and every parent must
    /// precede its children in the arena (which also rules out cycles).
    /// Child lists are rebuilt from the parent links.
    pub fn from_tasks(mut tasks: Vec<Task>) -> Result<Self> {
        for (i, task) in tasks.iter().enumerate() {
            if task.start_time < 0.0 || task.duration < 0.0 || task.self_time < 0.0 {
                return Err(TraceError::InvalidTiming {
                    name: task.event_name.clone(),
                    detail: "negative start, duration, or self time".to_string(),
                });
            }
            if task.self_time > task.duration + TIME_EPSILON_MS {
                return Err(TraceError::InvalidTiming {
                    name: task.event_name.clone(),
                    detail: format!(
                        "self time {:.3}ms exceeds duration {:.3}ms",
                        task.self_time, task.duration
                    ),
                });
            }
            if let Some(parent) = task.parent {
                if parent.0 >= i {
                    return Err(TraceError::InvalidForest(format!(
                        "task {} references parent {} that does not precede it",
                        i, parent.0
                    )));
                }
            }
        }

        for task in &mut tasks {
            task.children.clear();
        }
        for i in 0..tasks.len() {
            if let Some(parent) = tasks[i].parent {
                tasks[parent.0].children.push(TaskId(i));
            }
        }

        Ok(Self { tasks })
    }

    /// Build the forest from raw trace events
    ///
    /// Filters to the renderer main thread, nests events by timestamp
    /// containment, computes self-time, folds candidate URLs upward, and
    /// flags unbounded tasks (begin events with no matching end).
    pub fn from_events(events: &[TraceEvent]) -> Result<Self> {
        let records = main_thread_records(events)?;

        let base = records
            .iter()
            .map(|r| r.start_us)
            .fold(f64::INFINITY, f64::min);

        let mut sorted: Vec<&EventRecord> = records.iter().collect();
        sorted.sort_by(|a, b| {
            a.start_us
                .total_cmp(&b.start_us)
                .then(b.dur_us.total_cmp(&a.dur_us))
                .then(a.seq.cmp(&b.seq))
        });

        let mut tasks: Vec<Task> = Vec::with_capacity(sorted.len());
        let mut stack: Vec<TaskId> = Vec::new();

        for rec in sorted {
            let start = (rec.start_us - base) / 1000.0;
            let mut duration = rec.dur_us / 1000.0;

            while let Some(&top) = stack.last() {
                if tasks[top.0].end_time() <= start + TIME_EPSILON_MS {
                    stack.pop();
                } else {
                    break;
                }
            }

            let parent = stack.last().copied();
            if let Some(pid) = parent {
                let parent_end = tasks[pid.0].end_time();
                if start + duration > parent_end + TIME_EPSILON_MS {
                    if rec.unbounded {
                        // An unobserved end cannot outlive the enclosing task
                        duration = (parent_end - start).max(0.0);
                    } else {
                        return Err(TraceError::InvalidNesting {
                            name: rec.event.name.clone(),
                            start_ms: start,
                        });
                    }
                }
            }

            let id = TaskId(tasks.len());
            tasks.push(Task {
                event_name: rec.event.name.clone(),
                group: TaskGroup::from_event_name(&rec.event.name),
                start_time: start,
                duration,
                self_time: duration,
                parent,
                children: Vec::new(),
                unbounded: rec.unbounded,
                attributable_urls: rec.event.candidate_urls(),
            });
            if let Some(pid) = parent {
                tasks[pid.0].children.push(id);
            }
            stack.push(id);
        }

        compute_self_times(&mut tasks)?;
        propagate_urls(&mut tasks);
        propagate_unbounded(&mut tasks);

        tracing::debug!(
            tasks = tasks.len(),
            top_level = tasks.iter().filter(|t| t.parent.is_none()).count(),
            "built task forest"
        );

        Self::from_tasks(tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in traversal order, with their ids
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i), t))
    }
}

/// A complete (or synthesized-complete) durational event on the main thread
struct EventRecord<'a> {
    event: &'a TraceEvent,
    start_us: f64,
    dur_us: f64,
    unbounded: bool,
    seq: usize,
}

/// Extract durational records for the renderer main thread
///
/// Complete (`ph == "X"`) events are taken as-is. Begin/end pairs are
/// matched with a per-thread stack; a begin with no matching end runs to
/// the trace window end and is flagged unbounded.
fn main_thread_records(events: &[TraceEvent]) -> Result<Vec<EventRecord<'_>>> {
    let complete: Vec<&TraceEvent> = events
        .iter()
        .filter(|e| e.ph == "X" && e.dur.is_some())
        .collect();
    if complete.is_empty() {
        return Err(TraceError::EmptyTrace);
    }

    let trace_end_us = events
        .iter()
        .map(|e| e.ts + e.dur.unwrap_or(0.0))
        .fold(f64::NEG_INFINITY, f64::max);

    let main = pick_main_thread(&complete);
    tracing::debug!(pid = main.0, tid = main.1, "selected main thread");

    let mut records = Vec::new();
    let mut open: Vec<&TraceEvent> = Vec::new();
    let mut seq = 0usize;

    for event in events.iter().filter(|e| (e.pid, e.tid) == main) {
        match event.ph.as_str() {
            "X" => {
                if let Some(dur) = event.dur {
                    records.push(EventRecord {
                        event,
                        start_us: event.ts,
                        dur_us: dur,
                        unbounded: false,
                        seq,
                    });
                    seq += 1;
                }
            }
            "B" => open.push(event),
            "E" => {
                if let Some(begin) = open.pop() {
                    records.push(EventRecord {
                        event: begin,
                        start_us: begin.ts,
                        dur_us: (event.ts - begin.ts).max(0.0),
                        unbounded: false,
                        seq,
                    });
                    seq += 1;
                }
            }
            _ => {}
        }
    }

    // Begin events still open at the window end never finished
    for begin in open {
        records.push(EventRecord {
            event: begin,
            start_us: begin.ts,
            dur_us: (trace_end_us - begin.ts).max(0.0),
            unbounded: true,
            seq,
        });
        seq += 1;
    }

    Ok(records)
}

/// Prefer the thread emitting top-level scheduler events, else the busiest
fn pick_main_thread(complete: &[&TraceEvent]) -> (u64, u64) {
    if let Some(e) = complete
        .iter()
        .find(|e| TOP_LEVEL_EVENT_NAMES.contains(&e.name.as_str()))
    {
        return (e.pid, e.tid);
    }

    let mut counts: std::collections::HashMap<(u64, u64), usize> = std::collections::HashMap::new();
    for e in complete {
        *counts.entry((e.pid, e.tid)).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(key, count)| (count, std::cmp::Reverse(key)))
        .map(|(key, _)| key)
        .unwrap_or((0, 0))
}

fn compute_self_times(tasks: &mut [Task]) -> Result<()> {
    for i in 0..tasks.len() {
        let child_total: f64 = tasks[i]
            .children
            .clone()
            .iter()
            .map(|c| tasks[c.0].duration)
            .sum();
        let self_time = tasks[i].duration - child_total;
        if self_time < -TIME_EPSILON_MS * (tasks[i].children.len() + 1) as f64 {
            return Err(TraceError::InvalidTiming {
                name: tasks[i].event_name.clone(),
                detail: format!(
                    "children total {:.3}ms exceeds duration {:.3}ms",
                    child_total, tasks[i].duration
                ),
            });
        }
        tasks[i].self_time = self_time.max(0.0);
    }
    Ok(())
}

/// Fold each task's own candidate URLs into every ancestor, traversal order
fn propagate_urls(tasks: &mut [Task]) {
    for i in 0..tasks.len() {
        let urls = tasks[i].attributable_urls.clone();
        let mut ancestor = tasks[i].parent;
        while let Some(a) = ancestor {
            for url in &urls {
                if !tasks[a.0].attributable_urls.contains(url) {
                    tasks[a.0].attributable_urls.push(url.clone());
                }
            }
            ancestor = tasks[a.0].parent;
        }
    }
}

/// A truncated descendant truncates every ancestor's observed duration too
fn propagate_unbounded(tasks: &mut [Task]) {
    for i in 0..tasks.len() {
        if !tasks[i].unbounded {
            continue;
        }
        let mut ancestor = tasks[i].parent;
        while let Some(a) = ancestor {
            tasks[a.0].unbounded = true;
            ancestor = tasks[a.0].parent;
        }
    }
}
