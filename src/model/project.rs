use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::palette::{StagePalette, StageType};
use super::task::{date_serde, Stage, Task};
use crate::error::{EditError, ScheduleError};
use crate::schedule::{self, adjust, graph};

/// Stages a freshly added task gets, filtered by what the palette offers.
const DEFAULT_STAGES: [&str; 3] = ["Preparation", "Implementation", "Training/Adoption"];

/// A project: its tasks, their default start date and the stage palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "project_name", default = "default_name")]
    pub name: String,
    #[serde(rename = "project_start_date", with = "date_serde")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub stages: StagePalette,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

fn default_name() -> String {
    "Untitled Project".to_string()
}

/// One row of the manage-stages dialog: the palette entry as it should be,
/// plus the name it had before editing (`None` for a brand new type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEdit {
    pub entry: StageType,
    pub original_name: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, stages: StagePalette) -> Self {
        Self {
            name: name.into(),
            start_date,
            tasks: Vec::new(),
            stages,
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Date every task from the project's start date.
    pub fn schedule(&mut self) -> Result<(), ScheduleError> {
        schedule::calculate_task_dates(&mut self.tasks, self.start_date)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn task_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, EditError> {
        self.tasks
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| EditError::UnknownTask(name.to_string()))
    }

    /// Append a new task with the default stage set and return its name.
    pub fn add_task(&mut self) -> String {
        let mut n = self.tasks.len() + 1;
        let mut name = format!("New Task {n}");
        while self.task(&name).is_some() {
            n += 1;
            name = format!("New Task {n}");
        }

        let mut task = Task::new(name.clone());
        task.sub_tasks = DEFAULT_STAGES
            .iter()
            .filter(|s| self.stages.contains(s))
            .map(|s| Stage::new(*s, 1.0))
            .collect();
        self.tasks.push(task);
        self.touch();
        name
    }

    /// Remove a task; anything that depended on it loses its dependency.
    pub fn remove_task(&mut self, name: &str) -> Result<Task, EditError> {
        let index = self.position(name)?;
        for other in &mut self.tasks {
            if other.dependency() == Some(name) {
                other.depends_on = None;
            }
        }
        self.touch();
        Ok(self.tasks.remove(index))
    }

    /// Rename a task and every `depends_on` that pointed at the old name.
    pub fn rename_task(&mut self, old: &str, new: &str) -> Result<(), EditError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditError::EmptyName);
        }
        if new == old {
            return Ok(());
        }
        if self.task(new).is_some() {
            return Err(EditError::NameTaken(new.to_string()));
        }

        let index = self.position(old)?;
        self.tasks[index].name = new.to_string();
        for task in &mut self.tasks {
            if task.dependency() == Some(old) {
                task.depends_on = Some(new.to_string());
            }
        }
        self.touch();
        Ok(())
    }

    /// Move the task at `from` so it ends up at `to`.
    pub fn move_task(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditError::OutOfRange { index, len });
            }
        }
        if from != to {
            let task = self.tasks.remove(from);
            self.tasks.insert(to, task);
            self.touch();
        }
        Ok(())
    }

    /// Set or clear `task`'s dependency.
    ///
    /// Edges that would close a loop are refused. Linking drops any start pin.
    pub fn set_dependency(&mut self, task: &str, dependency: Option<&str>) -> Result<(), EditError> {
        let index = self.position(task)?;
        let dependency = dependency.filter(|d| !d.is_empty());

        match dependency {
            None => self.tasks[index].depends_on = None,
            Some(dep) => {
                self.position(dep)?;
                if graph::would_create_cycle(&self.tasks, task, Some(dep)) {
                    return Err(EditError::WouldCreateCycle {
                        task: task.to_string(),
                        dependency: dep.to_string(),
                    });
                }
                adjust::link_after(&mut self.tasks[index], dep);
            }
        }
        self.touch();
        Ok(())
    }

    /// Replace the palette, renaming stages whose type was renamed and
    /// dropping stages whose type was deleted.
    pub fn apply_stage_changes(&mut self, edits: Vec<StageEdit>) {
        let kept: Vec<&str> = edits
            .iter()
            .filter_map(|e| e.original_name.as_deref())
            .collect();
        let deleted: Vec<String> = self
            .stages
            .names()
            .filter(|name| !kept.contains(name))
            .map(str::to_string)
            .collect();
        let renamed: Vec<(&str, &str)> = edits
            .iter()
            .filter_map(|e| {
                e.original_name
                    .as_deref()
                    .filter(|orig| *orig != e.entry.name)
                    .map(|orig| (orig, e.entry.name.as_str()))
            })
            .collect();

        debug!(?deleted, ?renamed, "applying stage palette changes");

        for task in &mut self.tasks {
            task.sub_tasks.retain(|s| !deleted.contains(&s.name));
            for stage in &mut task.sub_tasks {
                if let Some((_, to)) = renamed.iter().find(|(from, _)| *from == stage.name) {
                    stage.name = to.to_string();
                }
            }
        }

        self.stages = StagePalette::new(edits.into_iter().map(|e| e.entry).collect());
        self.touch();
    }
}
