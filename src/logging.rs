//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `GANTT_PLANNER_LOG` environment variable (e.g. "info", "debug")
//! 3. `log_level` from the settings file
//! 4. default to `warn`

use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "GANTT_PLANNER_LOG";

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>, settings_level: Option<&str>) {
    let level = resolve_level(
        cli_level,
        std::env::var(LOG_ENV).ok().as_deref(),
        settings_level,
    );

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
    settings_level: Option<&str>,
) -> Level {
    cli_level
        .map(level_from_log_level)
        .or_else(|| env_level.and_then(parse_level_str))
        .or_else(|| settings_level.and_then(parse_level_str))
        .unwrap_or(Level::WARN)
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
