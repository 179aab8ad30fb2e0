// tests/persistence.rs
//
// File round trips: project JSON, templates, CSV import and export.

use chrono::NaiveDate;
use gantt_planner::io::csv_export::export_csv;
use gantt_planner::io::csv_import::{import_csv, read_headers, ColumnMapping, Field};
use gantt_planner::io::{load_project, load_template, save_project, save_template};
use gantt_planner::{
    Project, ScheduleError, Stage, StagePalette, StageStatus, StoreError, Task,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_project() -> Project {
    let mut project = Project::new("Office Move", date(2025, 1, 20), StagePalette::default());
    project.tasks = vec![
        Task::new("Plan")
            .with_stage(Stage::new("Preparation", 1.5).with_status(StageStatus::Completed))
            .with_stage(Stage::new("Implementation", 2.0)),
        Task::new("Pack")
            .depending_on("Plan")
            .with_end_override("07-02-2025")
            .with_stage(Stage::new("Implementation", 3.0).with_status(StageStatus::InProgress)),
    ];
    project
}

#[test]
fn saved_project_loads_without_dates_and_reschedules_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("office.gantt");

    let mut project = sample_project();
    project.schedule().unwrap();
    save_project(&project, &path).unwrap();

    let mut loaded = load_project(&path).unwrap();
    assert_eq!(loaded.name, "Office Move");
    assert_eq!(loaded.start_date, date(2025, 1, 20));
    assert!(loaded.tasks.iter().all(|t| t.start.is_none() && t.end.is_none()));
    assert_eq!(loaded.tasks[1].end_date_override.as_deref(), Some("07-02-2025"));

    loaded.schedule().unwrap();
    assert_eq!(loaded.tasks, project.tasks);
    assert_eq!(loaded.tasks[1].end, Some(date(2025, 2, 7)));
}

#[test]
fn loading_garbage_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.gantt");
    std::fs::write(&path, "{ \"project_name\": ").unwrap();
    assert!(matches!(load_project(&path), Err(StoreError::Json(_))));
    assert!(matches!(
        load_project(&dir.path().join("absent.gantt")),
        Err(StoreError::Io(_))
    ));
}

#[test]
fn runaway_stage_duration_in_a_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forever.gantt");
    std::fs::write(
        &path,
        r#"{
            "project_name": "Forever",
            "project_start_date": "20-01-2025",
            "tasks": [
                {"name": "Endless", "sub_tasks": [{"name": "Implementation", "duration": 1e8}]}
            ]
        }"#,
    )
    .unwrap();

    let mut project = load_project(&path).unwrap();
    assert_eq!(
        project.schedule(),
        Err(ScheduleError::DateOutOfRange { task: "Endless".into() })
    );
}

#[test]
fn template_round_trip_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("move.template");

    save_template(&sample_project(), &path).unwrap();
    let template = load_template(&path).unwrap();

    let mut project = template.instantiate(date(2025, 6, 2));
    project.schedule().unwrap();

    assert_eq!(project.tasks.len(), 2);
    assert_eq!(project.tasks[1].depends_on.as_deref(), Some("Plan"));
    assert_eq!(project.tasks[1].end_date_override, None);
    assert!(project
        .tasks
        .iter()
        .flat_map(|t| &t.sub_tasks)
        .all(|s| s.status == StageStatus::NotStarted));
    assert_eq!(project.tasks[0].start, Some(date(2025, 6, 2)));
}

#[test]
fn csv_import_schedule_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tasks.csv");
    let output = dir.path().join("schedule.csv");
    std::fs::write(
        &input,
        "Title,Begin,Predecessor,Phase\n\
         Survey,20-01-2025,,Preparation\n\
         Install,,Survey,Implementation\n",
    )
    .unwrap();

    let headers = read_headers(&input).unwrap();
    assert_eq!(headers, vec!["Title", "Begin", "Predecessor", "Phase"]);

    let mut mapping = ColumnMapping::detect(headers.iter().map(String::as_str));
    mapping.set(Field::TaskName, "Title");
    let (tasks, skipped) = import_csv(&input, &mapping).unwrap();
    assert_eq!(skipped, 0);

    let mut project = Project::new("Imported", date(2025, 1, 13), StagePalette::default());
    project.tasks = tasks;
    project.schedule().unwrap();

    assert_eq!(project.tasks[0].start, Some(date(2025, 1, 20)));
    assert_eq!(project.tasks[1].start, Some(date(2025, 1, 21)));

    assert_eq!(export_csv(&project.tasks, &output).unwrap(), 2);
    let text = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "Survey;;20-01-2025;20-01-2025;1;Not Started");
    assert_eq!(lines[4], "Install;Implementation;21-01-2025;21-01-2025;1;Not Started");
}
