//! Start-date resolution for a single task within one pass.

use chrono::{Days, NaiveDate};

use crate::error::ScheduleError;
use crate::model::task::{parse_date, Task};

use super::workdays::next_weekday;

/// Outcome of trying to place one task's start in the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDate {
    Resolved(NaiveDate),
    /// The predecessor has not been dated yet; try again next pass.
    Deferred,
}

fn out_of_range(task: &Task) -> ScheduleError {
    ScheduleError::DateOutOfRange {
        task: task.name.clone(),
    }
}

/// Determine where `task` starts. First matching rule wins:
///
/// 1. a start override, snapped forward off weekends;
/// 2. the day after the predecessor's end, snapped forward off weekends;
/// 3. the project start, as given.
///
/// `resolved_end` returns a predecessor's end date, or `None` while that
/// predecessor is still undated in this run.
pub fn resolve_start_date(
    task: &Task,
    resolved_end: impl Fn(&str) -> Option<NaiveDate>,
    project_start: NaiveDate,
) -> Result<StartDate, ScheduleError> {
    if let Some(literal) = task.start_date_override.as_deref().filter(|s| !s.is_empty()) {
        let date = parse_date(literal).ok_or_else(|| ScheduleError::InvalidDateFormat {
            task: task.name.clone(),
            value: literal.to_string(),
        })?;
        return next_weekday(date)
            .map(StartDate::Resolved)
            .ok_or_else(|| out_of_range(task));
    }

    if let Some(dependency) = task.dependency() {
        return match resolved_end(dependency) {
            Some(end) => end
                .checked_add_days(Days::new(1))
                .and_then(next_weekday)
                .map(StartDate::Resolved)
                .ok_or_else(|| out_of_range(task)),
            None => Ok(StartDate::Deferred),
        };
    }

    Ok(StartDate::Resolved(project_start))
}
