//! Configuration management for session-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, environment overrides, and atomic write operations.

use crate::{
    AppError, AppResult,
    atomic_file::write_atomic,
    config::{
        AudioConfig, ENV_BIT_DEPTH, ENV_CHANNELS, ENV_DATA_DIR, ENV_SAMPLE_RATE,
        RecorderSettings, StorageConfig,
    },
};

use session_recorder_core::RecorderConfig;

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage locations.
    pub storage: StorageConfig,
    /// Capture format.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Recorder behaviour.
    #[serde(default)]
    pub recorder: RecorderSettings,
}

impl Config {
    /// Defaults, storing everything under `data_dir`.
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: data_dir.into(),
            },
            audio: AudioConfig::default(),
            recorder: RecorderSettings::default(),
        }
    }

    /// Load configuration from the platform config directory, creating a
    /// default file if none exists, then apply environment overrides and
    /// make sure the data directory exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        let default_data_dir = proj_dirs.data_dir().join("recordings");
        let mut config = Self::load_from(&config_dir.join("config.toml"), &default_data_dir)?;

        config.apply_overrides(|key| std::env::var(key).ok());
        config.ensure_data_dir()?;

        Ok(config)
    }

    /// Load configuration from `config_path`, writing defaults rooted at
    /// `default_data_dir` there first if the file does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path, default_data_dir: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "No config found, creating default");
            let config = Self::with_data_dir(default_data_dir);
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `config_path` using atomic write pattern.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_atomic(config_path, &contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to write config {:?}: {}", config_path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Overrides fields from environment-style variables looked up through
    /// `lookup`. Values that do not parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup(ENV_DATA_DIR).filter(|value| !value.trim().is_empty()) {
            debug!(data_dir = %data_dir, "Data directory overridden from environment");
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(sample_rate) = parse_override(&lookup, ENV_SAMPLE_RATE) {
            self.audio.sample_rate = sample_rate;
        }
        if let Some(channels) = parse_override(&lookup, ENV_CHANNELS) {
            self.audio.channels = channels;
        }
        if let Some(bit_depth) = parse_override(&lookup, ENV_BIT_DEPTH) {
            self.audio.bit_depth = bit_depth;
        }
    }

    /// Creates the data directory if it does not exist yet.
    #[track_caller]
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        let data_dir = &self.storage.data_dir;
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to create data directory {:?}: {}", data_dir, e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            info!(data_dir = ?data_dir, "Created data directory");
        }
        Ok(())
    }

    /// Recorder parameters derived from this configuration.
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            data_dir: self.storage.data_dir.clone(),
            format: self.audio.format(),
            stop_timeout: self.recorder.stop_timeout(),
        }
    }

    /// Directory the rolling log files are written to.
    pub fn log_dir(&self) -> PathBuf {
        self.storage.data_dir.join("logs")
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "session-recorder", "Session-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
