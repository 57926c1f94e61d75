//! Process configuration resolved from environment variables.
//!
//! - `SPACETREE_DB_PATH`: SQLite file (default `<tmp>/spacetree.sqlite3`)
//! - `SPACETREE_EXPORT_DIR`: named snapshot directory (default `<tmp>/spacetree-exports`)
//! - `SPACETREE_LOG_LEVEL`: `trace|debug|info|warn|error` (default by build mode)
//! - `SPACETREE_LOG_DIR`: rolling log directory; logging stays off when unset
//!
//! Blank values fall back to their defaults.

use crate::logging::{default_log_level, LoggingConfig};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SPACETREE_DB_PATH";
pub const EXPORT_DIR_ENV: &str = "SPACETREE_EXPORT_DIR";
pub const LOG_LEVEL_ENV: &str = "SPACETREE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SPACETREE_LOG_DIR";

const DEFAULT_DB_FILE: &str = "spacetree.sqlite3";
const DEFAULT_EXPORT_DIR: &str = "spacetree-exports";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceTreeConfig {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl SpaceTreeConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE)),
            export_dir: read(EXPORT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_EXPORT_DIR)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Logging settings, when a log directory is configured.
    pub fn logging(&self) -> Option<LoggingConfig> {
        self.log_dir
            .as_ref()
            .map(|dir| LoggingConfig::new(self.log_level.clone(), dir.clone()))
    }
}
