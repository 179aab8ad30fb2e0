//! Error types for scheduling, project editing and file handling.

use thiserror::Error;

/// Why a full resolution run could not date every task.
///
/// A run that fails leaves the task list partially dated; callers must not
/// render it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid date format for '{task}': '{value}'. Please use DD-MM-YYYY.")]
    InvalidDateFormat { task: String, value: String },

    #[error(
        "Task '{task}' depends on '{missing}', but no task with that name exists. \
         Please remove or correct this dependency."
    )]
    MissingDependency { task: String, missing: String },

    #[error(
        "Circular dependency detected: {}. \
         Each task in this chain depends on the next, creating a loop.",
        .cycle.join(" → ")
    )]
    CircularDependency { cycle: Vec<String> },

    #[error(
        "Unable to calculate dates for: {}. This may be due to missing or invalid dependencies.",
        .tasks.join(", ")
    )]
    Unresolvable { tasks: Vec<String> },

    #[error("Task name '{0}' is used more than once")]
    DuplicateTaskName(String),

    #[error("Dates for '{task}' run past the end of the calendar. Check its stage durations.")]
    DateOutOfRange { task: String },
}

/// Rejected edits to a [`Project`](crate::model::Project).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("No task named '{0}'")]
    UnknownTask(String),

    #[error("A task named '{0}' already exists")]
    NameTaken(String),

    #[error("Task name must not be empty")]
    EmptyName,

    #[error("Making '{task}' depend on '{dependency}' would create a circular dependency")]
    WouldCreateCycle { task: String, dependency: String },

    #[error("Index {index} is out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Failures while reading or writing project, template and CSV files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' selected in the mapping does not exist in the file")]
    MissingColumn(String),

    #[error("You must map a column to 'Task Name'")]
    NoNameColumn,

    #[error("No valid tasks found in CSV ({0} rows skipped)")]
    NoTasks(usize),

    #[error("Tasks have no calculated dates; run the scheduler first")]
    Unscheduled,

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
