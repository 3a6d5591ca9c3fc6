//! Process configuration resolved from flags or `BOOKLIB_*` variables.
//!
//! # Responsibility
//! - Collect store location and logging settings in one place.
//! - Validate values early so entry points fail before opening storage.
//!
//! # Invariants
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - `log_dir`, when set, is absolute.
//! - An unset or blank `db_path` selects an in-memory store.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variables bound to the CLI flags of the same meaning.
pub const ENV_DB_PATH: &str = "BOOKLIB_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BOOKLIB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BOOKLIB_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be an absolute path, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file path; `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// Rolling log directory; `None` leaves file logging disabled.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds configuration from optional raw values, applying defaults.
    ///
    /// Entry points feed this from flags or the `BOOKLIB_*` variables.
    pub fn from_parts(
        db_path: Option<&str>,
        log_level: Option<&str>,
        log_dir: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let log_level = match non_blank(log_level) {
            Some(level) => normalize_level(level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = match non_blank(log_dir) {
            Some(dir) => {
                let path = Path::new(dir);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => None,
        };

        Ok(Self {
            db_path: non_blank(db_path).map(PathBuf::from),
            log_level,
            log_dir,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
