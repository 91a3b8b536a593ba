//! Drill settings read from a JSON config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interval::IntervalGenerator;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_INTERVAL_MIN: u64 = 30;
pub const DEFAULT_INTERVAL_MAX: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the JSON array of maneuver definitions.
    pub maneuvers_file: PathBuf,
    #[serde(default = "default_interval_min")]
    pub interval_min_sec: u64,
    #[serde(default = "default_interval_max")]
    pub interval_max_sec: u64,
    #[serde(default = "default_true")]
    pub show_next_maneuver_time: bool,
    #[serde(default = "default_true")]
    pub show_maneuver_type: bool,
    #[serde(default = "default_true")]
    pub show_maneuver_description: bool,
    /// Percent chance (0-100) that a draw lands on an emergency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_probability: Option<f64>,
    /// Wait for Enter between turns instead of a random timer.
    #[serde(default)]
    pub manual_mode: bool,
    /// SQLite history store. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

/// Which parts of a maneuver the console shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub show_countdown: bool,
    pub show_type: bool,
    pub show_description: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_countdown: true,
            show_type: true,
            show_description: true,
        }
    }
}

fn default_interval_min() -> u64 {
    DEFAULT_INTERVAL_MIN
}

fn default_interval_max() -> u64 {
    DEFAULT_INTERVAL_MAX
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maneuvers_file: PathBuf::from("maneuvers.json"),
            interval_min_sec: DEFAULT_INTERVAL_MIN,
            interval_max_sec: DEFAULT_INTERVAL_MAX,
            show_next_maneuver_time: true,
            show_maneuver_type: true,
            show_maneuver_description: true,
            emergency_probability: None,
            manual_mode: false,
            history_file: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(text).map_err(|e| Error::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    ///
    /// A relative `maneuvers_file` or `history_file` is resolved against the
    /// directory holding the config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Configuration(format!(
                "configuration file '{}' not found; run `chairfly init` to create one",
                path.display()
            )));
        }
        let text = fs::read_to_string(path)?;
        let mut settings = Self::from_json(&text).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.maneuvers_file = resolve(base, &settings.maneuvers_file);
        settings.history_file = settings.history_file.map(|p| resolve(base, &p));
        Ok(settings)
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("failed to serialize settings: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The interval bounds are only checked for timed sessions; manual
    /// sessions never consult them.
    pub fn validate(&self) -> Result<()> {
        if self.maneuvers_file.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "maneuvers_file must not be empty".to_string(),
            ));
        }
        if !self.manual_mode {
            self.interval()?;
        }
        if let Some(probability) = self.emergency_probability {
            if !(0.0..=100.0).contains(&probability) {
                return Err(Error::Configuration(format!(
                    "emergency_probability must be between 0 and 100, got {}",
                    probability
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Result<IntervalGenerator> {
        IntervalGenerator::new(self.interval_min_sec, self.interval_max_sec)
    }

    pub fn display(&self) -> DisplayFlags {
        DisplayFlags {
            show_countdown: self.show_next_maneuver_time,
            show_type: self.show_maneuver_type,
            show_description: self.show_maneuver_description,
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
