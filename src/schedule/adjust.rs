//! Edits to stage durations and task pins that an editor makes before
//! handing the list back to [`calculate_task_dates`](super::calculate_task_dates).
//!
//! The scheduler never rebalances stages itself; when a task has a fixed
//! end date it is these helpers that keep the stage durations inside it.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::EditError;
use crate::model::task::{format_date, Stage, Task};

use super::workdays::{add_work_days, count_work_days};

/// Smallest duration a drag can leave a stage with.
pub const MIN_STAGE_DURATION: f64 = 0.25;

/// Drags below this many days are treated as jitter.
const DRAG_DEADBAND: f64 = 0.1;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Snap a dragged duration to the nearest quarter day, ties to even.
pub fn snap_quarter(x: f64) -> f64 {
    (x * 4.0).round_ties_even() / 4.0
}

fn check_index(stages: &[Stage], index: usize) -> Result<(), EditError> {
    if index < stages.len() {
        Ok(())
    } else {
        Err(EditError::OutOfRange {
            index,
            len: stages.len(),
        })
    }
}

/// Spread the business days in `[task_start, end]` evenly over `stages`.
///
/// Each stage gets the total divided by the count, rounded to hundredths;
/// the rounding remainder goes to the first stage. Returns `false` and
/// leaves the stages alone when there are none or `end` precedes the start.
pub fn rebalance_to_end_date(task_start: NaiveDate, end: NaiveDate, stages: &mut [Stage]) -> bool {
    if stages.is_empty() || end < task_start {
        return false;
    }

    let total = count_work_days(task_start, end) as f64;
    let base = round2(total / stages.len() as f64);
    let mut durations = vec![base; stages.len()];
    let remainder = round2(total - durations.iter().sum::<f64>());
    durations[0] = round2(durations[0] + remainder);

    for (stage, duration) in stages.iter_mut().zip(durations) {
        stage.duration = duration.max(0.0);
    }
    true
}

/// Lower `stages[index]` so the stages fit between `task_start` and `end`.
///
/// The allowance never drops below [`MIN_STAGE_DURATION`]. Returns whether
/// the duration was reduced.
pub fn cap_stage_duration(
    task_start: NaiveDate,
    end: NaiveDate,
    stages: &mut [Stage],
    index: usize,
) -> Result<bool, EditError> {
    check_index(stages, index)?;

    let total_allowed = count_work_days(task_start, end) as f64;
    let others: f64 = stages
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, s)| s.duration)
        .sum();
    let allowed = (total_allowed - others).max(MIN_STAGE_DURATION);

    let stage = &mut stages[index];
    if stage.duration > allowed {
        debug!(stage = %stage.name, from = stage.duration, to = allowed, "capping stage duration");
        stage.duration = round2(allowed);
        return Ok(true);
    }
    Ok(false)
}

/// Set `stages[index]`'s duration from a typed end date.
///
/// The stage's start follows from its predecessors; an end before that start
/// is ignored. With an `end_override` in force the new duration is capped.
pub fn set_stage_end(
    task_start: NaiveDate,
    stages: &mut [Stage],
    index: usize,
    end: NaiveDate,
    end_override: Option<NaiveDate>,
) -> Result<(), EditError> {
    check_index(stages, index)?;

    let before: f64 = stages[..index].iter().map(|s| s.duration).sum();
    let stage_start = add_work_days(task_start, before);
    if end >= stage_start {
        stages[index].duration = count_work_days(stage_start, end) as f64;
    }

    if let Some(limit) = end_override {
        cap_stage_duration(task_start, limit, stages, index)?;
    }
    Ok(())
}

/// Pin a task to start on `date`; the pin replaces any dependency.
pub fn pin_task_start(task: &mut Task, date: NaiveDate) {
    task.start_date_override = Some(format_date(date));
    task.depends_on = None;
}

/// Make `task` follow `dependency`; the dependency replaces any start pin.
pub fn link_after(task: &mut Task, dependency: impl Into<String>) {
    task.depends_on = Some(dependency.into());
    task.start_date_override = None;
}

/// Durations captured when a drag begins, so deltas apply to the originals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub index: usize,
    pub current: f64,
    pub previous: Option<f64>,
    pub total: f64,
    pub last: f64,
}

impl DragOrigin {
    pub fn capture(task: &Task, index: usize) -> Result<Self, EditError> {
        check_index(&task.sub_tasks, index)?;
        Ok(Self {
            index,
            current: task.sub_tasks[index].duration,
            previous: index
                .checked_sub(1)
                .map(|i| task.sub_tasks[i].duration),
            total: task.total_duration(),
            last: task.sub_tasks.last().map(|s| s.duration).unwrap_or(0.0),
        })
    }
}

/// Drag a stage's right edge to `new_duration`.
///
/// The value snaps to quarter days with a floor of [`MIN_STAGE_DURATION`],
/// and is capped by the task's end target once the task has been dated.
pub fn resize_stage(task: &mut Task, index: usize, new_duration: f64) -> Result<f64, EditError> {
    check_index(&task.sub_tasks, index)?;

    task.sub_tasks[index].duration = snap_quarter(new_duration).max(MIN_STAGE_DURATION);
    if let (Some(start), Some(end)) = (task.start, task.end_override_date()) {
        cap_stage_duration(start, end, &mut task.sub_tasks, index)?;
    }
    Ok(task.sub_tasks[index].duration)
}

/// Drag the whole task's right edge so it spans `new_total` days.
///
/// The change lands on the last stage.
pub fn resize_task(task: &mut Task, origin: &DragOrigin, new_total: f64) {
    let new_total = snap_quarter(new_total).max(MIN_STAGE_DURATION);
    let delta = new_total - origin.total;
    if let Some(last) = task.sub_tasks.last_mut() {
        last.duration = (origin.last + delta).max(MIN_STAGE_DURATION);
    }
}

/// Drag stage `origin.index` sideways by `delta` days.
///
/// Any non-empty end override text counts as a fixed end, even one that
/// does not parse. With a fixed end the boundary with the previous stage
/// moves and both stages must keep at least [`MIN_STAGE_DURATION`]; dragging
/// the first stage pins the task to `new_start` and takes the delta out of
/// that stage. Without one the previous stage stretches, or the task is pinned
/// when the first stage is dragged. Returns whether anything changed.
pub fn shift_stage(
    task: &mut Task,
    origin: &DragOrigin,
    delta: f64,
    new_start: NaiveDate,
) -> Result<bool, EditError> {
    let index = origin.index;
    check_index(&task.sub_tasks, index)?;
    if delta.abs() < DRAG_DEADBAND {
        return Ok(false);
    }

    let fixed_end = task
        .end_date_override
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    match (fixed_end, origin.previous) {
        (true, Some(previous)) => {
            let new_previous = snap_quarter(previous + delta);
            let new_current = snap_quarter(origin.current - delta);
            if new_previous < MIN_STAGE_DURATION || new_current < MIN_STAGE_DURATION {
                return Ok(false);
            }
            task.sub_tasks[index - 1].duration = new_previous;
            task.sub_tasks[index].duration = new_current;
        }
        (true, None) => {
            pin_task_start(task, new_start);
            let new_current = snap_quarter(origin.current - delta);
            if new_current >= MIN_STAGE_DURATION {
                task.sub_tasks[index].duration = new_current;
            }
        }
        (false, Some(previous)) => {
            task.sub_tasks[index - 1].duration =
                snap_quarter(previous + delta).max(MIN_STAGE_DURATION);
        }
        (false, None) => pin_task_start(task, new_start),
    }
    Ok(true)
}
