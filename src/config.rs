use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ui::history::MAX_ROUNDS;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub samples: usize,
    pub tdelay_secs: u64,
    pub show_system: bool,
    pub show_user: bool,
    pub graphics: bool,
    pub sequential: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            samples: 10,
            tdelay_secs: 1,
            show_system: true,
            show_user: true,
            graphics: false,
            sequential: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: None,
            level: "info".to_string(),
        }
    }
}

/// The sampling parameters a run is driven by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub samples: usize,
    pub interval: Duration,
    pub show_system: bool,
    pub show_user: bool,
    pub graphics: bool,
    pub sequential: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig::from_general(&GeneralConfig::default())
    }
}

impl MonitorConfig {
    fn from_general(general: &GeneralConfig) -> Self {
        MonitorConfig {
            samples: general.samples,
            interval: Duration::from_secs(general.tdelay_secs),
            show_system: general.show_system,
            show_user: general.show_user,
            graphics: general.graphics,
            sequential: general.sequential,
        }
    }
}

impl GeneralConfig {
    pub fn monitor(&self) -> Result<MonitorConfig, ConfigError> {
        if !(1..=MAX_ROUNDS).contains(&self.samples) {
            return Err(ConfigError::SampleCount {
                got: self.samples,
                max: MAX_ROUNDS,
            });
        }
        Ok(MonitorConfig::from_general(self))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("statwatch").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
