use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;
use crate::model::{Project, Stage, StagePalette, StageStatus, Task};

/// Save a project to a JSON file.
///
/// Computed dates never reach the file; they are rebuilt on load.
pub fn save_project(project: &Project, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), tasks = project.tasks.len(), "project saved");
    Ok(())
}

/// Load a project from a JSON file.
pub fn load_project(path: &Path) -> Result<Project, StoreError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// A reusable project skeleton: task names, links and stage durations only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub tasks: Vec<TemplateTask>,
    #[serde(default)]
    pub stages: StagePalette,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTask {
    pub name: String,
    #[serde(default)]
    pub depends_on: Option<String>,
    #[serde(default)]
    pub sub_tasks: Vec<Stage>,
}

impl Template {
    /// Strip a project down to a template; stage progress is reset.
    pub fn from_project(project: &Project) -> Self {
        let tasks = project
            .tasks
            .iter()
            .map(|task| TemplateTask {
                name: task.name.clone(),
                depends_on: task.depends_on.clone(),
                sub_tasks: task
                    .sub_tasks
                    .iter()
                    .map(|s| Stage::new(s.name.clone(), s.duration))
                    .collect(),
            })
            .collect();
        Self {
            tasks,
            stages: project.stages.clone(),
        }
    }

    /// Start a new project from this template.
    pub fn instantiate(&self, start_date: NaiveDate) -> Project {
        let mut project = Project::new("New Project from Template", start_date, self.stages.clone());
        project.tasks = self
            .tasks
            .iter()
            .map(|t| {
                let mut task = Task::new(t.name.clone());
                task.depends_on = t.depends_on.clone();
                task.sub_tasks = t
                    .sub_tasks
                    .iter()
                    .map(|s| Stage::new(s.name.clone(), s.duration).with_status(StageStatus::NotStarted))
                    .collect();
                task
            })
            .collect();
        project
    }
}

/// Save a project as a template file.
pub fn save_template(project: &Project, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(&Template::from_project(project))?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "template saved");
    Ok(())
}

/// Load a template file.
pub fn load_template(path: &Path) -> Result<Template, StoreError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_PROJECT: &str = r##"{
        "project_name": "Security Rollout",
        "project_start_date": "20-01-2025",
        "tasks": [
            {
                "name": "MFA",
                "depends_on": null,
                "start_date_override": null,
                "sub_tasks": [
                    {"name": "Preparation", "duration": 0.5, "status": "In Progress"}
                ]
            }
        ],
        "stages": {"Preparation": "#f0ad4e", "Implementation": "#5bc0de"},
        "legend_position": [0.1, 0.9]
    }"##;

    #[test]
    fn reads_legacy_project_layout() {
        let project: Project = serde_json::from_str(LEGACY_PROJECT).unwrap();
        assert_eq!(project.name, "Security Rollout");
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        assert_eq!(project.tasks[0].sub_tasks[0].status, StageStatus::InProgress);
        assert_eq!(
            project.stages.names().collect::<Vec<_>>(),
            vec!["Preparation", "Implementation"]
        );
    }

    #[test]
    fn written_project_uses_pair_list_and_literal_date() {
        let project: Project = serde_json::from_str(LEGACY_PROJECT).unwrap();
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["project_start_date"], "20-01-2025");
        assert_eq!(value["stages"][0][0], "Preparation");
    }

    #[test]
    fn template_resets_progress_and_drops_overrides() {
        let mut project: Project = serde_json::from_str(LEGACY_PROJECT).unwrap();
        project.tasks[0].start_date_override = Some("27-01-2025".into());

        let template = Template::from_project(&project);
        let fresh = template.instantiate(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

        assert_eq!(fresh.name, "New Project from Template");
        assert_eq!(fresh.tasks[0].start_date_override, None);
        assert_eq!(fresh.tasks[0].sub_tasks[0].status, StageStatus::NotStarted);
        assert_eq!(fresh.tasks[0].sub_tasks[0].duration, 0.5);
    }
}
