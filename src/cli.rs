//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `gantt-planner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gantt-planner",
    version,
    about = "Resolve business-day schedules for Gantt projects.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GANTT_PLANNER_LOG`, the settings file, or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Settings file (default: the platform config directory).
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve and print every task and stage date
    Schedule {
        /// Project file (.gantt)
        project: PathBuf,

        /// Override the project start date (DD-MM-YYYY)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the chain of tasks a task waits on, nearest first
    Chain {
        project: PathBuf,
        task: String,
    },

    /// Check whether linking TASK after DEPENDENCY would create a loop
    CheckLink {
        project: PathBuf,
        task: String,
        dependency: String,
    },

    /// Create an empty project file
    New {
        project: PathBuf,

        #[arg(long, default_value = "New Project")]
        name: String,

        /// Project start date (DD-MM-YYYY, default today)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,
    },

    /// Import tasks from a CSV file into a new project
    Import {
        csv: PathBuf,

        /// Project file to write
        #[arg(long, short)]
        output: PathBuf,

        /// Project start date (DD-MM-YYYY, default today)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        /// Explicit column mapping, e.g. `--map "Task Name=Title"`.
        /// Unmapped fields are guessed from the headers.
        #[arg(long = "map", value_name = "FIELD=COLUMN")]
        mappings: Vec<String>,
    },

    /// Export the resolved schedule as CSV
    Export {
        project: PathBuf,
        csv: PathBuf,

        #[arg(long, value_name = "DATE")]
        start: Option<String>,
    },

    /// Save or instantiate project templates
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum TemplateCommand {
    /// Save a project's structure as a template
    Save { project: PathBuf, template: PathBuf },

    /// Start a new project from a template
    Load {
        template: PathBuf,

        #[arg(long, short)]
        output: PathBuf,

        #[arg(long, value_name = "DATE")]
        start: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
