use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::task::format_date;
use crate::model::Task;

fn date_cell(date: Option<NaiveDate>) -> Result<String, StoreError> {
    date.map(format_date).ok_or(StoreError::Unscheduled)
}

fn duration_cell(days: f64) -> String {
    let text = format!("{days:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Write a resolved schedule as semicolon-delimited CSV.
///
/// Columns: Task ; Stage ; Start ; End ; Duration ; Status. Each task row is
/// followed by one row per stage. Dates are DD-MM-YYYY. Returns the number of
/// tasks written.
pub fn write_csv<W: Write>(tasks: &[Task], writer: W) -> Result<usize, StoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(["Task", "Stage", "Start", "End", "Duration", "Status"])?;

    for task in tasks {
        let (start, end) = (date_cell(task.start)?, date_cell(task.end)?);
        wtr.write_record([
            task.name.as_str(),
            "",
            start.as_str(),
            end.as_str(),
            duration_cell(task.total_duration()).as_str(),
            task.aggregate_status().label(),
        ])?;
        for stage in &task.sub_tasks {
            let (start, end) = (date_cell(stage.start)?, date_cell(stage.end)?);
            wtr.write_record([
                task.name.as_str(),
                stage.name.as_str(),
                start.as_str(),
                end.as_str(),
                duration_cell(stage.duration).as_str(),
                stage.status.label(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(tasks.len())
}

/// Export a resolved schedule to a CSV file. See [`write_csv`].
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, StoreError> {
    let file = std::fs::File::create(path)?;
    write_csv(tasks, file)
}
