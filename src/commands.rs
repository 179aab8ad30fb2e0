//! Handlers behind each CLI subcommand.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::io::csv_import::{self, ColumnMapping, Field};
use crate::io::{self as store, Template};
use crate::model::task::{format_date, parse_date};
use crate::model::{Project, Task};
use crate::schedule;
use crate::settings::AppSettings;

fn start_date(literal: Option<&str>) -> Result<NaiveDate> {
    match literal {
        Some(s) => parse_date(s).ok_or_else(|| anyhow!("invalid date '{s}', expected DD-MM-YYYY")),
        None => Ok(Local::now().date_naive()),
    }
}

fn load_scheduled(path: &Path, start: Option<&str>) -> Result<Project> {
    let mut project = store::load_project(path)
        .with_context(|| format!("loading project from {:?}", path))?;
    if let Some(s) = start {
        project.start_date = start_date(Some(s))?;
    }
    project
        .schedule()
        .with_context(|| format!("scheduling {:?}", project.name))?;
    Ok(project)
}

/// One dated row of the `schedule` output.
#[derive(Debug, Serialize)]
pub struct ScheduledItem {
    pub task: String,
    pub stage: Option<String>,
    pub start: String,
    pub end: String,
    pub duration: f64,
    pub status: String,
}

pub fn schedule_rows(tasks: &[Task]) -> Vec<ScheduledItem> {
    let date = |d: Option<NaiveDate>| d.map(format_date).unwrap_or_default();
    let mut rows = Vec::new();
    for task in tasks {
        rows.push(ScheduledItem {
            task: task.name.clone(),
            stage: None,
            start: date(task.start),
            end: date(task.end),
            duration: task.total_duration(),
            status: task.aggregate_status().to_string(),
        });
        for stage in &task.sub_tasks {
            rows.push(ScheduledItem {
                task: task.name.clone(),
                stage: Some(stage.name.clone()),
                start: date(stage.start),
                end: date(stage.end),
                duration: stage.duration,
                status: stage.status.to_string(),
            });
        }
    }
    rows
}

pub fn schedule(path: &Path, start: Option<&str>, json: bool) -> Result<()> {
    let project = load_scheduled(path, start)?;
    let rows = schedule_rows(&project.tasks);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} (starts {})", project.name, format_date(project.start_date));
    for row in rows {
        match row.stage {
            None => println!(
                "{:<40} {} → {}  {:>6}d  {}",
                row.task, row.start, row.end, row.duration, row.status
            ),
            Some(stage) => println!(
                "  {:<38} {} → {}  {:>6}d  {}",
                stage, row.start, row.end, row.duration, row.status
            ),
        }
    }
    Ok(())
}

pub fn chain(path: &Path, task: &str) -> Result<()> {
    let project = store::load_project(path)?;
    if project.task(task).is_none() {
        return Err(anyhow!("no task named '{task}'"));
    }
    let chain = schedule::get_dependency_chain(&project.tasks, task);
    if chain.is_empty() {
        println!("'{task}' has no dependencies");
    } else {
        println!("{task} ← {}", chain.join(" ← "));
    }
    Ok(())
}

pub fn check_link(path: &Path, task: &str, dependency: &str) -> Result<()> {
    let project = store::load_project(path)?;
    if schedule::would_create_cycle(&project.tasks, task, Some(dependency)) {
        return Err(anyhow!(
            "making '{task}' depend on '{dependency}' would create a circular dependency"
        ));
    }
    println!("ok: '{task}' can depend on '{dependency}'");
    Ok(())
}

pub fn new_project(path: &Path, name: &str, start: Option<&str>, settings: &AppSettings) -> Result<()> {
    let project = Project::new(name, start_date(start)?, settings.stages.clone());
    store::save_project(&project, path)?;
    Ok(())
}

fn parse_mapping(headers: &[String], explicit: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::detect(headers.iter().map(String::as_str));
    for entry in explicit {
        let (field, column) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("mapping '{entry}' is not FIELD=COLUMN"))?;
        let field: Field = field.parse().map_err(|e: String| anyhow!(e))?;
        mapping.set(field, column.trim());
    }
    Ok(mapping)
}

pub fn import(
    csv_path: &Path,
    output: &Path,
    start: Option<&str>,
    mappings: &[String],
    settings: &AppSettings,
) -> Result<()> {
    let headers = csv_import::read_headers(csv_path)
        .with_context(|| format!("reading headers of {:?}", csv_path))?;
    let mapping = parse_mapping(&headers, mappings)?;
    let (tasks, skipped) = csv_import::import_csv(csv_path, &mapping)?;
    info!(imported = tasks.len(), skipped, "CSV import finished");

    let mut project = Project::new("Imported Project", start_date(start)?, settings.stages.clone());
    project.tasks = tasks;
    store::save_project(&project, output)?;
    println!("imported {} tasks ({} rows skipped)", project.tasks.len(), skipped);
    Ok(())
}

pub fn export(path: &Path, csv_path: &Path, start: Option<&str>) -> Result<()> {
    let project = load_scheduled(path, start)?;
    let written = store::csv_export::export_csv(&project.tasks, csv_path)?;
    println!("exported {written} tasks to {}", csv_path.display());
    Ok(())
}

pub fn save_template(project: &Path, template: &Path) -> Result<()> {
    let project = store::load_project(project)?;
    store::save_template(&project, template)?;
    Ok(())
}

pub fn load_template(template: &Path, output: &Path, start: Option<&str>) -> Result<()> {
    let template: Template = store::load_template(template)
        .with_context(|| format!("loading template from {:?}", template))?;
    let mut project = template.instantiate(start_date(start)?);
    project.schedule()?;
    store::save_project(&project, output)?;
    Ok(())
}
