use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::error::StoreError;
use crate::model::{Stage, StageStatus, Task};

/// Stage name used when the file has no stage column.
const DEFAULT_STAGE: &str = "Default Stage";

/// Imported rows carry no duration; the editor fixes this up later.
const PLACEHOLDER_DURATION: f64 = 1.0;

/// Logical fields a CSV column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TaskName,
    StartDate,
    EndDate,
    Dependencies,
    Stage,
    Status,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Self::TaskName,
        Self::StartDate,
        Self::EndDate,
        Self::Dependencies,
        Self::Stage,
        Self::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TaskName => "Task Name",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
            Self::Dependencies => "Dependencies",
            Self::Stage => "Stage",
            Self::Status => "Status",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_header(s);
        Self::ALL
            .into_iter()
            .find(|f| normalize_header(f.label()) == key)
            .or_else(|| header_to_field(&key))
            .ok_or_else(|| format!("unknown import field '{s}'"))
    }
}

/// Which header feeds each field. Unmapped fields are simply not imported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<(Field, String)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, header: impl Into<String>) -> &mut Self {
        self.columns.retain(|(f, _)| *f != field);
        self.columns.push((field, header.into()));
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, h)| h.as_str())
    }

    /// Guess a mapping from header names ("Task Label", "Start Date", ...).
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping = Self::new();
        for header in headers {
            if let Some(field) = header_to_field(&normalize_header(header)) {
                if mapping.get(field).is_none() {
                    mapping.set(field, header);
                }
            }
        }
        mapping
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_field(normalized: &str) -> Option<Field> {
    match normalized {
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Field::TaskName)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Field::StartDate),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Field::EndDate)
        }
        "dependencies" | "dependency" | "dependson" | "predecessor" | "after" => {
            Some(Field::Dependencies)
        }
        "stage" | "phase" => Some(Field::Stage),
        "status" | "state" | "progress" => Some(Field::Status),
        _ => None,
    }
}

/// Import tasks from CSV text.
///
/// Every row becomes one task with a single placeholder stage. Date and
/// dependency cells are copied verbatim into the override fields; the
/// scheduler validates them later. Returns `(tasks, skipped_count)`.
pub fn import_csv_str(
    content: &str,
    mapping: &ColumnMapping,
) -> Result<(Vec<Task>, usize), StoreError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |field: Field| -> Result<Option<usize>, StoreError> {
        match mapping.get(field) {
            None => Ok(None),
            Some(name) => headers
                .iter()
                .position(|h| h == name)
                .map(Some)
                .ok_or_else(|| StoreError::MissingColumn(name.to_string())),
        }
    };

    let name_col = column(Field::TaskName)?.ok_or(StoreError::NoNameColumn)?;
    let start_col = column(Field::StartDate)?;
    let end_col = column(Field::EndDate)?;
    let dep_col = column(Field::Dependencies)?;
    let stage_col = column(Field::Stage)?;
    let status_col = column(Field::Status)?;

    let mut tasks = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = i + 2, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let cell = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let Some(name) = cell(Some(name_col)) else {
            skipped += 1;
            continue;
        };

        let stage_name = cell(stage_col).unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let status = cell(status_col)
            .map(|s| StageStatus::from_loose(&s))
            .unwrap_or_default();

        let mut task = Task::new(name)
            .with_stage(Stage::new(stage_name, PLACEHOLDER_DURATION).with_status(status));
        task.start_date_override = cell(start_col);
        task.end_date_override = cell(end_col);
        task.depends_on = cell(dep_col);
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(StoreError::NoTasks(skipped));
    }
    Ok((tasks, skipped))
}

/// Import tasks from a CSV file. See [`import_csv_str`].
pub fn import_csv(path: &Path, mapping: &ColumnMapping) -> Result<(Vec<Task>, usize), StoreError> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content, mapping)
}

/// Read just the header row, for building a [`ColumnMapping`].
pub fn read_headers(path: &Path) -> Result<Vec<String>, StoreError> {
    let content = std::fs::read_to_string(path)?;
    let first_line = content.lines().next().unwrap_or("");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Task Label;Start Date;End Date;Depends On;Status\n\
                          Design;20-01-2025;24-01-2025;;In Progress\n\
                          ;;;;\n\
                          Build;;;Design;done\n";

    #[test]
    fn detects_mapping_from_headers() {
        let mapping = ColumnMapping::detect(["Task Label", "Start Date", "Finish", "Phase"]);
        assert_eq!(mapping.get(Field::TaskName), Some("Task Label"));
        assert_eq!(mapping.get(Field::StartDate), Some("Start Date"));
        assert_eq!(mapping.get(Field::EndDate), Some("Finish"));
        assert_eq!(mapping.get(Field::Stage), Some("Phase"));
        assert_eq!(mapping.get(Field::Status), None);
    }

    #[test]
    fn rows_become_single_stage_tasks() {
        let mapping = ColumnMapping::detect(["Task Label", "Start Date", "End Date", "Depends On", "Status"]);
        let (tasks, skipped) = import_csv_str(SAMPLE, &mapping).unwrap();

        assert_eq!(skipped, 1);
        assert_eq!(tasks.len(), 2);

        let design = &tasks[0];
        assert_eq!(design.start_date_override.as_deref(), Some("20-01-2025"));
        assert_eq!(design.end_date_override.as_deref(), Some("24-01-2025"));
        assert_eq!(design.depends_on, None);
        assert_eq!(design.sub_tasks[0].name, DEFAULT_STAGE);
        assert_eq!(design.sub_tasks[0].duration, PLACEHOLDER_DURATION);
        assert_eq!(design.sub_tasks[0].status, StageStatus::InProgress);

        let build = &tasks[1];
        assert_eq!(build.depends_on.as_deref(), Some("Design"));
        assert_eq!(build.start_date_override, None);
        assert_eq!(build.sub_tasks[0].status, StageStatus::Completed);
    }

    #[test]
    fn comma_files_work_too() {
        let mut mapping = ColumnMapping::new();
        mapping.set(Field::TaskName, "name");
        let (tasks, _) = import_csv_str("name,notes\nA,x\nB,y\n", &mapping).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn mapping_errors_are_reported() {
        let mut mapping = ColumnMapping::new();
        mapping.set(Field::TaskName, "Missing");
        assert!(matches!(
            import_csv_str(SAMPLE, &mapping),
            Err(StoreError::MissingColumn(c)) if c == "Missing"
        ));

        assert!(matches!(
            import_csv_str(SAMPLE, &ColumnMapping::new()),
            Err(StoreError::NoNameColumn)
        ));
    }

    #[test]
    fn empty_result_is_an_error() {
        let mapping = ColumnMapping::detect(["Task"]);
        assert!(matches!(
            import_csv_str("Task\n\n", &mapping),
            Err(StoreError::NoTasks(_))
        ));
    }

    #[test]
    fn field_names_parse_from_labels_and_aliases() {
        assert_eq!("Task Name".parse::<Field>(), Ok(Field::TaskName));
        assert_eq!("depends_on".parse::<Field>(), Ok(Field::Dependencies));
        assert!("colour".parse::<Field>().is_err());
    }
}
