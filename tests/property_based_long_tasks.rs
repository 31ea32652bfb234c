//! Property-based tests for long-task selection and attribution
//!
//! Covers the pipeline's structural guarantees over generated task forests:
//! threshold filtering, top-level-only selection, unbounded exclusion, the
//! report cap, sort order, and determinism.

use atasco::attribution::{attributable_url, BLANK_PAGE_URL};
use atasco::report::assemble_rows;
use atasco::selector::{select_long_tasks, MAX_REPORTED_TASKS};
use atasco::task_forest::{Task, TaskForest, TaskGroup, TaskId};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_task() -> impl Strategy<Value = Task> {
    (
        0.0f64..10_000.0,
        0.0f64..500.0,
        any::<bool>(),
        prop::collection::vec("[a-z]{1,8}\\.js", 0..3),
        prop_oneof![
            Just("RunTask".to_string()),
            Just("MajorGC".to_string()),
            Just("MinorGC".to_string()),
            Just("CpuProfiler::StartProfiling".to_string()),
            Just("EvaluateScript".to_string()),
        ],
    )
        .prop_map(|(start, duration, unbounded, urls, event_name)| Task {
            event_name,
            group: TaskGroup::Other,
            start_time: start,
            duration,
            self_time: duration,
            parent: None,
            children: Vec::new(),
            unbounded,
            attributable_urls: urls
                .into_iter()
                .map(|u| format!("https://example.com/{}", u))
                .collect(),
        })
}

fn arb_forest() -> impl Strategy<Value = TaskForest> {
    prop::collection::vec(arb_task(), 0..60).prop_map(|mut tasks| {
        // Nest every third task under the one before it
        for i in (2..tasks.len()).step_by(3) {
            tasks[i].parent = Some(TaskId(i - 1));
            let parent_duration = tasks[i - 1].duration;
            tasks[i].duration = tasks[i].duration.min(parent_duration);
            tasks[i].self_time = tasks[i].duration;
        }
        TaskForest::from_tasks(tasks).expect("generated forest is valid")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_every_row_meets_threshold(forest in arb_forest(), threshold in 1.0f64..200.0) {
        let selected = select_long_tasks(&forest, threshold, MAX_REPORTED_TASKS);
        for id in &selected {
            prop_assert!(forest.get(*id).duration >= threshold);
        }
    }

    #[test]
    fn prop_only_top_level_bounded_tasks(forest in arb_forest()) {
        let selected = select_long_tasks(&forest, 50.0, MAX_REPORTED_TASKS);
        for id in &selected {
            let task = forest.get(*id);
            prop_assert!(task.parent.is_none());
            prop_assert!(!task.unbounded);
        }
    }

    #[test]
    fn prop_cap_never_exceeded_and_keeps_largest(forest in arb_forest()) {
        let selected = select_long_tasks(&forest, 10.0, MAX_REPORTED_TASKS);
        prop_assert!(selected.len() <= MAX_REPORTED_TASKS);

        // Any qualifying task left out must not exceed the smallest kept one
        if selected.len() == MAX_REPORTED_TASKS {
            let smallest_kept = forest.get(*selected.last().unwrap()).duration;
            for (id, task) in forest.iter() {
                let qualifies =
                    task.parent.is_none() && !task.unbounded && task.duration >= 10.0;
                if qualifies && !selected.contains(&id) {
                    prop_assert!(task.duration <= smallest_kept);
                }
            }
        }
    }

    #[test]
    fn prop_durations_non_increasing(forest in arb_forest(), threshold in 1.0f64..200.0) {
        let selected = select_long_tasks(&forest, threshold, MAX_REPORTED_TASKS);
        let durations: Vec<f64> = selected.iter().map(|&id| forest.get(id).duration).collect();
        for pair in durations.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn prop_pipeline_deterministic(forest in arb_forest()) {
        let known: HashSet<String> = ["https://example.com/app.js".to_string()].into();
        let first = assemble_rows(&forest, &select_long_tasks(&forest, 50.0, MAX_REPORTED_TASKS), &known);
        let second = assemble_rows(&forest, &select_long_tasks(&forest, 50.0, MAX_REPORTED_TASKS), &known);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_attribution_total(task in arb_task()) {
        // Attribution always resolves to exactly one non-empty identity,
        // and never to the blank-page sentinel
        let known: HashSet<String> = HashSet::new();
        let url = attributable_url(&task, &known);
        prop_assert!(!url.is_empty());
        prop_assert_ne!(url, BLANK_PAGE_URL);
    }

    #[test]
    fn prop_known_script_always_preferred(
        urls in prop::collection::vec("[a-z]{1,8}\\.js", 1..4),
        pick in 0usize..4,
    ) {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| format!("https://example.com/{}", u))
            .collect();
        let pick = pick % urls.len();
        let known: HashSet<String> = [urls[pick].clone()].into();

        let task = Task {
            event_name: "RunTask".to_string(),
            group: TaskGroup::Other,
            start_time: 0.0,
            duration: 100.0,
            self_time: 100.0,
            parent: None,
            children: Vec::new(),
            unbounded: false,
            attributable_urls: urls.clone(),
        };

        let resolved = attributable_url(&task, &known);
        // The first candidate that is a known script wins; with one known
        // script that is the picked URL itself
        let expected = urls.iter().find(|u| known.contains(*u)).unwrap();
        prop_assert_eq!(&resolved, expected);
    }
}
