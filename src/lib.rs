pub mod cli;
pub mod commands;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod settings;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Command, TemplateCommand};
use crate::settings::AppSettings;

pub use crate::error::{EditError, ScheduleError, StoreError};
pub use crate::model::{Project, Stage, StagePalette, StageStatus, Task};
pub use crate::schedule::{
    add_work_days, calculate_task_dates, count_work_days, find_dependency_cycle,
    get_dependency_chain, would_create_cycle,
};

/// High-level entry point used by `main.rs`.
///
/// Settings are passed in so the caller can feed their log level to the
/// subscriber before anything else runs.
pub fn run(args: CliArgs, settings: &AppSettings) -> Result<()> {
    debug!(command = ?args.command, "dispatching");
    match &args.command {
        Command::Schedule { project, start, json } => {
            commands::schedule(project, start.as_deref(), *json)
        }
        Command::Chain { project, task } => commands::chain(project, task),
        Command::CheckLink { project, task, dependency } => {
            commands::check_link(project, task, dependency)
        }
        Command::New { project, name, start } => {
            commands::new_project(project, name, start.as_deref(), settings)
        }
        Command::Import { csv, output, start, mappings } => {
            commands::import(csv, output, start.as_deref(), mappings, settings)
        }
        Command::Export { project, csv, start } => commands::export(project, csv, start.as_deref()),
        Command::Template(TemplateCommand::Save { project, template }) => {
            commands::save_template(project, template)
        }
        Command::Template(TemplateCommand::Load { template, output, start }) => {
            commands::load_template(template, output, start.as_deref())
        }
    }
}
