//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily check-in and weekly reflection reminder times
//! - Calendar start date (the first month the calendar renders)
//!
//! Configuration is stored at `~/.config/pulsecor/config.toml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::medication::parse_reminder_time;

/// Reminder configuration.
///
/// Only the data contract lives here; notification delivery is up to
/// whatever shell embeds the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub daily_check_in_enabled: bool,
    /// "HH:MM", 24-hour clock.
    #[serde(default = "default_check_in_time")]
    pub daily_check_in_time: String,
    #[serde(default)]
    pub weekly_reflection_enabled: bool,
    #[serde(default = "default_reflection_time")]
    pub weekly_reflection_time: String,
}

/// Calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First day the calendar covers. Months before this never render.
    #[serde(default = "default_app_start_date")]
    pub app_start_date: NaiveDate,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pulsecor/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_check_in_time() -> String {
    "20:00".into()
}
fn default_reflection_time() -> String {
    "18:00".into()
}
fn default_app_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).expect("valid constant date")
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            daily_check_in_enabled: true,
            daily_check_in_time: default_check_in_time(),
            weekly_reflection_enabled: false,
            weekly_reflection_time: default_reflection_time(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            app_start_date: default_app_start_date(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminders: RemindersConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// The daily check-in reminder as (hour, minute), if enabled and valid.
    pub fn check_in_reminder(&self) -> Option<(u32, u32)> {
        if !self.reminders.daily_check_in_enabled {
            return None;
        }
        parse_reminder_time(&self.reminders.daily_check_in_time)
    }

    /// Set the daily check-in reminder time, validating the "HH:MM" format.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is not a valid 24-hour "HH:MM" string
    /// or the config cannot be saved.
    pub fn set_check_in_time(&mut self, time: &str) -> Result<()> {
        if parse_reminder_time(time).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "reminders.daily_check_in_time".into(),
                message: format!("'{time}' is not a valid HH:MM time"),
            }
            .into());
        }
        self.reminders.daily_check_in_time = time.to_string();
        self.save()
    }
}
