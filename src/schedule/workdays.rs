//! Business-day (Mon–Fri) date arithmetic.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Move forward to the first weekday on or after `date`.
///
/// `None` only when that weekday lies past the end of the calendar.
pub fn next_weekday(date: NaiveDate) -> Option<NaiveDate> {
    let mut day = date;
    while is_weekend(day) {
        day = day.checked_add_days(Days::new(1))?;
    }
    Some(day)
}

/// The date reached after spending `duration` business days starting on `start`.
///
/// Day one of any positive span is `start` itself, so the result is `start`
/// advanced by `ceil(duration) - 1` business days. Zero, `(0, 1]` and
/// negative durations all return `start`. A weekend `start` is taken as given.
/// `None` when the result falls outside the calendar or `duration` is not finite.
pub fn checked_add_work_days(start: NaiveDate, duration: f64) -> Option<NaiveDate> {
    if !duration.is_finite() {
        return None;
    }
    let steps = (duration.ceil() - 1.0).max(0.0);
    if steps > u32::MAX as f64 {
        return None;
    }
    let steps = steps as u64;
    if steps == 0 {
        return Some(start);
    }

    // Any seven consecutive days hold five weekdays. Keep 1..=5 steps for the
    // walk so a weekend start still lands on a weekday.
    let weeks = (steps - 1) / 5;
    let mut remaining = steps - weeks * 5;
    let mut day = start.checked_add_days(Days::new(weeks * 7))?;
    while remaining > 0 {
        day = day.checked_add_days(Days::new(1))?;
        if !is_weekend(day) {
            remaining -= 1;
        }
    }
    Some(day)
}

/// [`checked_add_work_days`], saturating at the last representable date.
pub fn add_work_days(start: NaiveDate, duration: f64) -> NaiveDate {
    checked_add_work_days(start, duration).unwrap_or(NaiveDate::MAX)
}

/// Business days in `[start, end]`, inclusive; 0 when `end < start`.
pub fn count_work_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !is_weekend(*d))
        .count() as u32
}
