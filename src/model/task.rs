use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The one date literal format accepted across the crate boundary.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a `DD-MM-YYYY` literal.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Format a date as `DD-MM-YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Progress state of a single stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl StageStatus {
    pub const ALL: [StageStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Lenient mapping used by importers; unknown text counts as not started.
    pub fn from_loose(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "finished" => Ok(Self::Completed),
            "in progress" | "in-progress" | "active" | "started" => Ok(Self::InProgress),
            "not started" | "not-started" | "new" | "planned" => Ok(Self::NotStarted),
            other => Err(format!("unknown stage status '{other}'")),
        }
    }
}

/// An ordered phase within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage type from the palette, e.g. "Preparation". Not unique.
    pub name: String,
    /// Length in business days; fractions allowed.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub status: StageStatus,
    /// Derived by the scheduler; never persisted.
    #[serde(skip)]
    pub start: Option<NaiveDate>,
    #[serde(skip)]
    pub end: Option<NaiveDate>,
}

impl Stage {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            status: StageStatus::NotStarted,
            start: None,
            end: None,
        }
    }

    pub fn with_status(mut self, status: StageStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn clear_dates(&mut self) {
        self.start = None;
        self.end = None;
    }
}

/// A top-level schedulable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique key across the project.
    pub name: String,
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Manual start pin, `DD-MM-YYYY`.
    #[serde(default)]
    pub start_date_override: Option<String>,
    /// Fixed end-date target, `DD-MM-YYYY`.
    #[serde(default)]
    pub end_date_override: Option<String>,
    #[serde(default)]
    pub sub_tasks: Vec<Stage>,
    #[serde(skip)]
    pub start: Option<NaiveDate>,
    #[serde(skip)]
    pub end: Option<NaiveDate>,
}

impl Task {
    /// Create a task with no dependency, overrides or stages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: None,
            start_date_override: None,
            end_date_override: None,
            sub_tasks: Vec::new(),
            start: None,
            end: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.sub_tasks.push(stage);
        self
    }

    pub fn depending_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on = Some(dependency.into());
        self
    }

    pub fn with_start_override(mut self, literal: impl Into<String>) -> Self {
        self.start_date_override = Some(literal.into());
        self
    }

    pub fn with_end_override(mut self, literal: impl Into<String>) -> Self {
        self.end_date_override = Some(literal.into());
        self
    }

    /// The dependency name, treating an empty string as absent.
    pub fn dependency(&self) -> Option<&str> {
        self.depends_on.as_deref().filter(|d| !d.is_empty())
    }

    /// The end-date target if it is set and parses; bad literals are ignored.
    pub fn end_override_date(&self) -> Option<NaiveDate> {
        self.end_date_override
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(parse_date)
    }

    pub fn total_duration(&self) -> f64 {
        self.sub_tasks.iter().map(|s| s.duration).sum()
    }

    /// Roll the stage statuses up into one.
    pub fn aggregate_status(&self) -> StageStatus {
        if self.sub_tasks.is_empty() {
            return StageStatus::NotStarted;
        }
        if self.sub_tasks.iter().all(|s| s.status == StageStatus::Completed) {
            StageStatus::Completed
        } else if self.sub_tasks.iter().all(|s| s.status == StageStatus::NotStarted) {
            StageStatus::NotStarted
        } else {
            StageStatus::InProgress
        }
    }

    /// Drop every derived date on the task and its stages.
    pub fn clear_dates(&mut self) {
        self.start = None;
        self.end = None;
        for stage in &mut self.sub_tasks {
            stage.clear_dates();
        }
    }
}

/// Serde helper for `DD-MM-YYYY` dates.
pub(crate) mod date_serde {
    use chrono::NaiveDate;
    use serde::{self, de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{s}', expected DD-MM-YYYY")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_day_month_year() {
        assert_eq!(parse_date("31-01-2025"), NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(parse_date("2025-01-31"), None);
        assert_eq!(parse_date("31/01/2025"), None);
    }

    #[test]
    fn aggregate_status_rolls_up() {
        let mut task = Task::new("T")
            .with_stage(Stage::new("Preparation", 1.0).with_status(StageStatus::Completed))
            .with_stage(Stage::new("Implementation", 1.0).with_status(StageStatus::Completed));
        assert_eq!(task.aggregate_status(), StageStatus::Completed);

        task.sub_tasks[1].status = StageStatus::NotStarted;
        assert_eq!(task.aggregate_status(), StageStatus::InProgress);

        task.sub_tasks[0].status = StageStatus::NotStarted;
        assert_eq!(task.aggregate_status(), StageStatus::NotStarted);

        assert_eq!(Task::new("Empty").aggregate_status(), StageStatus::NotStarted);
    }

    #[test]
    fn derived_dates_are_not_serialized() {
        let mut task = Task::new("T").with_stage(Stage::new("Preparation", 2.0));
        task.start = NaiveDate::from_ymd_opt(2025, 1, 20);
        task.sub_tasks[0].end = NaiveDate::from_ymd_opt(2025, 1, 21);

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("start").is_none());
        assert!(json["sub_tasks"][0].get("end").is_none());
        assert_eq!(json["sub_tasks"][0]["status"], "Not Started");
    }

    #[test]
    fn unset_links_and_pins_are_written_as_null() {
        let json = serde_json::to_value(Task::new("T")).unwrap();
        for key in ["depends_on", "start_date_override", "end_date_override"] {
            assert!(json[key].is_null(), "{key}");
            assert!(json.get(key).is_some(), "{key} missing");
        }

        let back: Task = serde_json::from_str(r#"{"name": "T"}"#).unwrap();
        assert_eq!(back, Task::new("T"));
    }

    #[test]
    fn status_parses_leniently() {
        assert_eq!(StageStatus::from_loose("done"), StageStatus::Completed);
        assert_eq!(StageStatus::from_loose(" In Progress "), StageStatus::InProgress);
        assert_eq!(StageStatus::from_loose("whatever"), StageStatus::NotStarted);
    }
}
