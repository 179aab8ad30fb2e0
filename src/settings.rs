//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{StagePalette, StatusColors};

/// Defaults for new projects and for the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Palette given to new projects and imports.
    pub stages: StagePalette,
    pub status_colors: StatusColors,
    /// Log level used when neither the flag nor the env var sets one.
    pub log_level: Option<String>,
}

impl AppSettings {
    /// Where settings live: the platform config dir, or `./settings.json`.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "GanttPlanner") {
            Some(proj_dirs) => proj_dirs.config_dir().join("settings.json"),
            None => PathBuf::from("settings.json"),
        }
    }

    /// Load settings. A missing file yields defaults; anything else that
    /// goes wrong is returned.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load settings, keeping the defaults when the file is unusable.
    ///
    /// The error comes back alongside so the caller can log it once the
    /// subscriber is installed.
    pub fn load_or_default(path: &Path) -> (Self, Option<StoreError>) {
        match Self::load(path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
