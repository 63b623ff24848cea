//! Runtime settings read from the environment at start-up.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bus-reservation-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "reservations.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "bus-reservation-manager.log";

/// Overrides the database location.
pub const DB_PATH_ENV: &str = "BUS_RESERVATION_DB";
/// `tracing_subscriber::EnvFilter` directives, e.g. `debug` or
/// `bus_reservation_manager=trace`.
pub const LOG_FILTER_ENV: &str = "BUS_RESERVATION_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var_os(DB_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };
        let log_filter = env::var(LOG_FILTER_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self::with_db_path(db_path, log_filter))
    }

    /// Build a config rooted at an explicit database path. The log file lands
    /// in the same directory.
    pub fn with_db_path(db_path: PathBuf, log_filter: impl Into<String>) -> Self {
        let log_path = db_path
            .parent()
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        Self {
            db_path,
            log_path,
            log_filter: log_filter.into(),
        }
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_sits_next_to_database() {
        let config = AppConfig::with_db_path(PathBuf::from("/tmp/buses/res.sqlite"), "debug");
        assert_eq!(config.log_path, PathBuf::from("/tmp/buses").join(LOG_FILE_NAME));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn environment_overrides_path_and_blank_filter_falls_back() {
        env::set_var(DB_PATH_ENV, "/srv/buses/custom.sqlite");
        env::set_var(LOG_FILTER_ENV, "   ");
        let config = AppConfig::from_env().unwrap();

        env::set_var(LOG_FILTER_ENV, "bus_reservation_manager=debug");
        let filtered = AppConfig::from_env().unwrap();

        env::remove_var(DB_PATH_ENV);
        env::remove_var(LOG_FILTER_ENV);

        assert_eq!(config.db_path, PathBuf::from("/srv/buses/custom.sqlite"));
        assert_eq!(
            config.log_path,
            PathBuf::from("/srv/buses").join(LOG_FILE_NAME)
        );
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(filtered.log_filter, "bus_reservation_manager=debug");
    }
}
