//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Provide defaults for storage location, log level and schedule views.
//! - Reject malformed overrides with the offending variable named.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - The resolved comparison grid always passes `ComparisonGrid::validate()`.

use crate::logging::{default_log_level, normalize_level};
use crate::schedule::compare::{CompareError, ComparisonGrid};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CAMPUSLIFE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CAMPUSLIFE_LOG_LEVEL";
pub const ENV_GRID_START_HOUR: &str = "CAMPUSLIFE_GRID_START_HOUR";
pub const ENV_GRID_END_HOUR: &str = "CAMPUSLIFE_GRID_END_HOUR";
pub const ENV_SLOT_MINUTES: &str = "CAMPUSLIFE_SLOT_MINUTES";
pub const ENV_MARK_HORIZON_DAYS: &str = "CAMPUSLIFE_MARK_HORIZON_DAYS";

const DEFAULT_DB_FILE_NAME: &str = "campuslife.sqlite3";
const DEFAULT_MARK_HORIZON_DAYS: u32 = 180;
const MAX_MARK_HORIZON_DAYS: u32 = 3660;

/// Invalid configuration override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {}=`{}`: {}",
            self.variable, self.value, self.reason
        )
    }
}

impl Error for ConfigError {}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub grid: ComparisonGrid,
    /// Number of days the calendar view marks ahead of its start date.
    pub mark_horizon_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            grid: ComparisonGrid::default(),
            mark_horizon_days: DEFAULT_MARK_HORIZON_DAYS,
        }
    }
}

impl AppConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value_of = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = value_of(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value_of(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level)
                .map_err(|err| ConfigError {
                    variable: ENV_LOG_LEVEL,
                    value: level.clone(),
                    reason: err.to_string(),
                })?
                .to_string();
        }
        if let Some(raw) = value_of(ENV_GRID_START_HOUR) {
            config.grid.start_hour = parse_u32(ENV_GRID_START_HOUR, &raw)?;
        }
        if let Some(raw) = value_of(ENV_GRID_END_HOUR) {
            config.grid.end_hour = parse_u32(ENV_GRID_END_HOUR, &raw)?;
        }
        if let Some(raw) = value_of(ENV_SLOT_MINUTES) {
            config.grid.slot_minutes = parse_u32(ENV_SLOT_MINUTES, &raw)?;
        }
        config.grid.validate().map_err(|err| {
            let (variable, value) = match &err {
                CompareError::InvalidSlotMinutes(minutes) => (ENV_SLOT_MINUTES, minutes.to_string()),
                _ => (
                    ENV_GRID_END_HOUR,
                    format!("{}..{}", config.grid.start_hour, config.grid.end_hour),
                ),
            };
            ConfigError {
                variable,
                value,
                reason: err.to_string(),
            }
        })?;
        if let Some(raw) = value_of(ENV_MARK_HORIZON_DAYS) {
            let days = parse_u32(ENV_MARK_HORIZON_DAYS, &raw)?;
            if days == 0 || days > MAX_MARK_HORIZON_DAYS {
                return Err(ConfigError {
                    variable: ENV_MARK_HORIZON_DAYS,
                    value: raw,
                    reason: format!("expected 1..={MAX_MARK_HORIZON_DAYS}"),
                });
            }
            config.mark_horizon_days = days;
        }

        Ok(config)
    }
}

fn parse_u32(variable: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.parse::<u32>().map_err(|err| ConfigError {
        variable,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        AppConfig, ENV_DB_PATH, ENV_GRID_END_HOUR, ENV_LOG_LEVEL, ENV_MARK_HORIZON_DAYS,
        ENV_SLOT_MINUTES,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.grid.start_hour, 8);
        assert_eq!(config.mark_horizon_days, 180);
    }

    #[test]
    fn overrides_are_applied_and_blank_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /data/app.sqlite3 "),
            (ENV_SLOT_MINUTES, "30"),
            (ENV_MARK_HORIZON_DAYS, "  "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/app.sqlite3"));
        assert_eq!(config.grid.slot_minutes, 30);
        assert_eq!(config.mark_horizon_days, 180);
    }

    #[test]
    fn malformed_numbers_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_GRID_END_HOUR, "late")])).unwrap_err();
        assert_eq!(err.variable, ENV_GRID_END_HOUR);
        assert_eq!(err.value, "late");
    }

    #[test]
    fn log_level_is_normalized_or_rejected() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "WARNING")])).unwrap();
        assert_eq!(config.log_level, "warn");

        let err = AppConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert_eq!(err.variable, ENV_LOG_LEVEL);
        assert_eq!(err.value, "loud");
    }

    #[test]
    fn inconsistent_grid_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_GRID_END_HOUR, "6")])).unwrap_err();
        assert!(err.reason.contains("grid hours"));
    }
}
