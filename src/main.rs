use gantt_planner::settings::AppSettings;
use gantt_planner::{cli, logging, run};
use tracing::warn;

fn main() {
    if let Err(err) = run_main() {
        eprintln!("gantt-planner error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let settings_path = args.settings.clone().unwrap_or_else(AppSettings::default_path);
    let (settings, settings_error) = AppSettings::load_or_default(&settings_path);
    logging::init_logging(args.log_level, settings.log_level.as_deref());
    if let Some(err) = settings_error {
        warn!(path = %settings_path.display(), error = %err, "failed to read settings, using defaults");
    }
    run(args, &settings)
}
