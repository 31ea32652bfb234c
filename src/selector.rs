//! Long task selection
//!
//! Filters the task forest down to the top-level, fully-bounded tasks whose
//! duration meets the long-task threshold, ranked by duration descending and
//! truncated to a fixed report cap.
//!
//! Only top-level tasks qualify: a task's duration already includes all
//! nested work, so counting descendants would double-count their time.

use crate::task_forest::{TaskForest, TaskId};

/// Standard long-task definition: 50ms of main-thread time
pub const DEFAULT_LONG_TASK_THRESHOLD_MS: f64 = 50.0;

/// The report is a diagnostic top-N list, not an exhaustive one
pub const MAX_REPORTED_TASKS: usize = 20;

/// Select the long tasks to report
///
/// Keeps tasks that are top-level, bounded, and whose duration meets or
/// exceeds `threshold_ms`; sorts them by duration descending and truncates
/// to `max_tasks`. The sort is stable over arena (traversal) order, so
/// equal-duration tasks keep a deterministic relative order.
///
/// Pure function of its inputs; the forest is never mutated.
pub fn select_long_tasks(forest: &TaskForest, threshold_ms: f64, max_tasks: usize) -> Vec<TaskId> {
    let mut selected: Vec<TaskId> = forest
        .iter()
        .filter(|(_, task)| {
            task.parent.is_none() && !task.unbounded && task.duration >= threshold_ms
        })
        .map(|(id, _)| id)
        .collect();

    selected.sort_by(|a, b| forest.get(*b).duration.total_cmp(&forest.get(*a).duration));
    selected.truncate(max_tasks);

    tracing::debug!(
        selected = selected.len(),
        threshold_ms,
        "selected long tasks"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_forest::{Task, TaskGroup, TaskId};

    fn top_level_task(start: f64, duration: f64) -> Task {
        Task {
            event_name: "RunTask".to_string(),
            group: TaskGroup::Other,
            start_time: start,
            duration,
            self_time: duration,
            parent: None,
            children: Vec::new(),
            unbounded: false,
            attributable_urls: Vec::new(),
        }
    }

    fn forest(tasks: Vec<Task>) -> TaskForest {
        TaskForest::from_tasks(tasks).unwrap()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let f = forest(vec![
            top_level_task(0.0, 49.9),
            top_level_task(100.0, 50.0),
            top_level_task(200.0, 50.1),
        ]);
        let selected = select_long_tasks(&f, DEFAULT_LONG_TASK_THRESHOLD_MS, MAX_REPORTED_TASKS);
        assert_eq!(selected.len(), 2);
        assert!(!selected.contains(&TaskId(0)));
    }

    #[test]
    fn test_child_tasks_excluded() {
        let mut child = top_level_task(10.0, 200.0);
        child.parent = Some(TaskId(0));
        let f = forest(vec![top_level_task(0.0, 300.0), child]);

        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert_eq!(selected, vec![TaskId(0)]);
    }

    #[test]
    fn test_unbounded_excluded() {
        let mut unbounded = top_level_task(0.0, 5000.0);
        unbounded.unbounded = true;
        let f = forest(vec![unbounded, top_level_task(100.0, 60.0)]);

        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert_eq!(selected, vec![TaskId(1)]);
    }

    #[test]
    fn test_sorted_descending() {
        let f = forest(vec![
            top_level_task(0.0, 60.0),
            top_level_task(100.0, 300.0),
            top_level_task(500.0, 120.0),
        ]);
        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        let durations: Vec<f64> = selected.iter().map(|&id| f.get(id).duration).collect();
        assert_eq!(durations, vec![300.0, 120.0, 60.0]);
    }

    #[test]
    fn test_equal_durations_keep_traversal_order() {
        let f = forest(vec![
            top_level_task(0.0, 100.0),
            top_level_task(200.0, 100.0),
            top_level_task(400.0, 100.0),
        ]);
        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert_eq!(selected, vec![TaskId(0), TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_cap_keeps_largest() {
        let tasks: Vec<Task> = (0..30)
            .map(|i| top_level_task(i as f64 * 1000.0, 50.0 + i as f64))
            .collect();
        let f = forest(tasks);

        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert_eq!(selected.len(), 20);
        // The 20 largest are durations 79 down to 60
        assert_eq!(f.get(selected[0]).duration, 79.0);
        assert_eq!(f.get(selected[19]).duration, 60.0);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let f = forest(vec![top_level_task(0.0, 10.0)]);
        let selected = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let f = forest(vec![
            top_level_task(0.0, 100.0),
            top_level_task(200.0, 80.0),
            top_level_task(400.0, 100.0),
        ]);
        let first = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        let second = select_long_tasks(&f, 50.0, MAX_REPORTED_TASKS);
        assert_eq!(first, second);
    }
}
