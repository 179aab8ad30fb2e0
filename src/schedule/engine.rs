//! Fixed-point date resolution over a whole task list.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::error::ScheduleError;
use crate::model::Task;

use super::graph::diagnose;
use super::resolve::{resolve_start_date, StartDate};
use super::stages::schedule_stages;

/// Date every task and stage in `tasks`, in place.
///
/// Previously computed dates are cleared first, so each call is a full
/// recomputation. Tasks may appear in any order: each pass dates whatever
/// has become resolvable, and the run stops once everything is dated or a
/// pass makes no progress. On error the list is left partially dated.
pub fn calculate_task_dates(
    tasks: &mut [Task],
    project_start: NaiveDate,
) -> Result<(), ScheduleError> {
    for task in tasks.iter_mut() {
        task.clear_dates();
    }

    let mut index: HashMap<String, usize> = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if index.insert(task.name.clone(), i).is_some() {
            return Err(ScheduleError::DuplicateTaskName(task.name.clone()));
        }
    }

    let mut resolved: HashSet<String> = HashSet::with_capacity(tasks.len());
    let max_passes = tasks.len() * 2;

    for pass in 0..max_passes {
        let mut made_progress = false;

        for i in 0..tasks.len() {
            if resolved.contains(&tasks[i].name) {
                continue;
            }

            let start = {
                let view: &[Task] = &*tasks;
                resolve_start_date(
                    &view[i],
                    |name| index.get(name).and_then(|&j| view[j].end),
                    project_start,
                )?
            };

            if let StartDate::Resolved(start) = start {
                schedule_stages(&mut tasks[i], start)?;
                trace!(task = %tasks[i].name, start = ?tasks[i].start, end = ?tasks[i].end, "task dated");
                resolved.insert(tasks[i].name.clone());
                made_progress = true;
            }
        }

        debug!(pass, resolved = resolved.len(), total = tasks.len(), "resolution pass done");

        if resolved.len() == tasks.len() {
            return Ok(());
        }

        if !made_progress {
            let view: &[Task] = &*tasks;
            let unresolved: Vec<&str> = view
                .iter()
                .map(|t| t.name.as_str())
                .filter(|name| !resolved.contains(*name))
                .collect();
            return Err(diagnose(view, &unresolved));
        }
    }

    if resolved.len() == tasks.len() {
        return Ok(());
    }
    Err(ScheduleError::Unresolvable {
        tasks: tasks
            .iter()
            .filter(|t| !resolved.contains(&t.name))
            .map(|t| t.name.clone())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monday() -> NaiveDate {
        date(2025, 1, 20)
    }

    fn task(name: &str, duration: f64) -> Task {
        Task::new(name).with_stage(Stage::new("S", duration))
    }

    #[test]
    fn empty_list_is_trivially_resolved() {
        let mut tasks: Vec<Task> = Vec::new();
        assert!(calculate_task_dates(&mut tasks, monday()).is_ok());
    }

    #[test]
    fn independent_task_starts_at_project_start() {
        let mut tasks = vec![task("A", 3.0)];
        calculate_task_dates(&mut tasks, monday()).unwrap();
        assert_eq!(tasks[0].start, Some(monday()));
        assert_eq!(tasks[0].sub_tasks[0].end, Some(date(2025, 1, 22)));
    }

    #[test]
    fn dependent_starts_after_predecessor() {
        let mut tasks = vec![task("A", 3.0), task("B", 2.0).depending_on("A")];
        calculate_task_dates(&mut tasks, monday()).unwrap();
        assert_eq!(tasks[0].end, Some(date(2025, 1, 22)));
        assert_eq!(tasks[1].start, Some(date(2025, 1, 23)));
        assert_eq!(tasks[1].end, Some(date(2025, 1, 24)));
    }

    #[test]
    fn friday_finish_pushes_dependent_to_monday() {
        let mut tasks = vec![task("A", 5.0), task("B", 1.0).depending_on("A")];
        calculate_task_dates(&mut tasks, monday()).unwrap();
        assert_eq!(tasks[0].end, Some(date(2025, 1, 24)));
        assert_eq!(tasks[1].start, Some(date(2025, 1, 27)));
        assert_eq!(tasks[1].end, Some(date(2025, 1, 27)));
    }

    #[test]
    fn chain_listed_backwards_still_resolves() {
        let mut tasks = vec![
            task("C", 1.0).depending_on("B"),
            task("B", 1.0).depending_on("A"),
            task("A", 2.0),
        ];
        calculate_task_dates(&mut tasks, monday()).unwrap();
        assert_eq!(tasks[2].start, Some(date(2025, 1, 20)));
        assert_eq!(tasks[1].start, Some(date(2025, 1, 22)));
        assert_eq!(tasks[0].start, Some(date(2025, 1, 23)));
    }

    #[test]
    fn two_cycle_is_reported_with_both_names() {
        let mut tasks = vec![task("A", 1.0).depending_on("B"), task("B", 1.0).depending_on("A")];
        let err = calculate_task_dates(&mut tasks, monday()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CircularDependency {
                cycle: vec!["A".into(), "B".into(), "A".into()]
            }
        );
        assert!(err.to_string().contains("Circular dependency"));
        assert!(err.to_string().contains("A → B → A"));
    }

    #[test]
    fn missing_dependency_names_both_sides() {
        let mut tasks = vec![task("A", 1.0).depending_on("Non-existent Task")];
        let err = calculate_task_dates(&mut tasks, monday()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'A'"));
        assert!(message.contains("'Non-existent Task'"));
    }

    #[test]
    fn bad_start_override_aborts_the_run() {
        let mut tasks = vec![task("A", 1.0).with_start_override("2025-01-20")];
        let err = calculate_task_dates(&mut tasks, monday()).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDateFormat { .. }));
    }

    #[test]
    fn failure_leaves_resolvable_tasks_dated() {
        let mut tasks = vec![task("Free", 1.0), task("Stuck", 1.0).depending_on("Ghost")];
        assert!(calculate_task_dates(&mut tasks, monday()).is_err());
        assert_eq!(tasks[0].start, Some(monday()));
        assert_eq!(tasks[1].start, None);
    }

    #[test]
    fn huge_duration_is_reported_instead_of_panicking() {
        let mut tasks = vec![task("A", 1.0), task("B", 1e8).depending_on("A")];
        let err = calculate_task_dates(&mut tasks, monday()).unwrap_err();
        assert_eq!(err, ScheduleError::DateOutOfRange { task: "B".into() });
        assert!(err.to_string().contains("'B'"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut tasks = vec![task("A", 1.0), task("A", 2.0)];
        let err = calculate_task_dates(&mut tasks, monday()).unwrap_err();
        assert_eq!(err, ScheduleError::DuplicateTaskName("A".into()));
    }

    #[test]
    fn rerun_replaces_previous_dates() {
        let mut tasks = vec![task("A", 1.0), task("B", 1.0).depending_on("Ghost")];
        let _ = calculate_task_dates(&mut tasks, monday());

        tasks[1].depends_on = None;
        let later = date(2025, 2, 3);
        calculate_task_dates(&mut tasks, later).unwrap();
        assert_eq!(tasks[0].start, Some(later));
        assert_eq!(tasks[1].start, Some(later));
        assert_eq!(tasks[0].sub_tasks[0].end, Some(later));
    }
}
