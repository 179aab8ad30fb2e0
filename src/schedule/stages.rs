//! Lays a task's stages out end to end once its start is known.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::ScheduleError;
use crate::model::task::{parse_date, Stage, Task};

use super::workdays::{add_work_days, checked_add_work_days};

/// Date every stage of `task` from `start`, then the task itself.
///
/// Stage starts come from the running fractional total so quarter-day
/// stages don't drift. A valid end override (parses and is not before
/// `start`) becomes the task's end verbatim; stage durations are left alone.
/// Fails when a date would run past the end of the calendar.
pub fn schedule_stages(task: &mut Task, start: NaiveDate) -> Result<(), ScheduleError> {
    let out_of_range = || ScheduleError::DateOutOfRange {
        task: task.name.clone(),
    };

    let mut dates = Vec::with_capacity(task.sub_tasks.len());
    let mut cumulative = 0.0;
    for (i, stage) in task.sub_tasks.iter().enumerate() {
        let stage_start = if i == 0 {
            start
        } else {
            checked_add_work_days(start, cumulative).ok_or_else(out_of_range)?
        };
        let stage_end =
            checked_add_work_days(stage_start, stage.duration).ok_or_else(out_of_range)?;
        dates.push((stage_start, stage_end));
        cumulative += stage.duration;
    }
    let computed_end =
        checked_add_work_days(start, task.total_duration()).ok_or_else(out_of_range)?;

    for (stage, (stage_start, stage_end)) in task.sub_tasks.iter_mut().zip(dates) {
        stage.start = Some(stage_start);
        stage.end = Some(stage_end);
    }

    let pinned_end = if task.sub_tasks.is_empty() {
        None
    } else {
        end_override(task, start)
    };
    task.start = Some(start);
    task.end = Some(pinned_end.unwrap_or(computed_end));
    Ok(())
}

/// The task's end target, if it is usable for a task starting on `start`.
fn end_override(task: &Task, start: NaiveDate) -> Option<NaiveDate> {
    let literal = task.end_date_override.as_deref().filter(|s| !s.is_empty())?;
    match parse_date(literal) {
        Some(end) if end >= start => Some(end),
        Some(end) => {
            warn!(task = %task.name, %end, %start, "end date override precedes task start, ignoring");
            None
        }
        None => {
            warn!(task = %task.name, literal, "unparseable end date override, ignoring");
            None
        }
    }
}

/// The `(start, end)` of each stage as an editor would preview them.
pub fn preview_stage_dates(start: NaiveDate, stages: &[Stage]) -> Vec<(NaiveDate, NaiveDate)> {
    let mut cumulative = 0.0;
    stages
        .iter()
        .map(|stage| {
            let stage_start = add_work_days(start, cumulative);
            cumulative += stage.duration;
            (stage_start, add_work_days(stage_start, stage.duration))
        })
        .collect()
}
