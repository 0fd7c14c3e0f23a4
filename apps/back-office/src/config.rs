//! # Configuration
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default                                  |
//! |-----------------------------|------------------------------------------|
//! | `CLOWEE_DB_PATH`            | `<platform data dir>/clowee.db`          |
//! | `CLOWEE_DB_MAX_CONNECTIONS` | `5`                                      |
//! | `CLOWEE_LOG`                | `info,clowee=debug,back_office=debug,sqlx=warn` |
//!
//! `RUST_LOG`, when set, wins over `CLOWEE_LOG`.

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "info,clowee=debug,back_office=debug,sqlx=warn";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DB_FILE_NAME: &str = "clowee.db";

/// Back-office configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Pool size; at least 1.
    pub max_connections: u32,

    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = match lookup("CLOWEE_DB_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path(),
        };

        let max_connections = match lookup("CLOWEE_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("CLOWEE_DB_MAX_CONNECTIONS".to_string()))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let log_filter = lookup("RUST_LOG")
            .or_else(|| lookup("CLOWEE_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(AppConfig {
            db_path,
            max_connections,
            log_filter,
        })
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }
}

/// Platform data directory, or the working directory when none exists.
///
/// - **macOS**: `~/Library/Application Support/com.clowee.back-office/clowee.db`
/// - **Windows**: `%APPDATA%\clowee\back-office\data\clowee.db`
/// - **Linux**: `~/.local/share/back-office/clowee.db`
fn default_db_path() -> PathBuf {
    match ProjectDirs::from("com", "clowee", "back-office") {
        Some(dirs) => dirs.data_dir().join(DB_FILE_NAME),
        None => PathBuf::from(DB_FILE_NAME),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot create data directory {path}: {reason}")]
    DataDir { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.db_path.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CLOWEE_DB_PATH", "/tmp/x.db"),
            ("CLOWEE_DB_MAX_CONNECTIONS", " 8 "),
            ("CLOWEE_LOG", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_rust_log_wins() {
        let config = AppConfig::from_lookup(lookup(&[("CLOWEE_LOG", "warn"), ("RUST_LOG", "trace")])).unwrap();
        assert_eq!(config.log_filter, "trace");
    }

    #[test]
    fn test_invalid_pool_size() {
        for bad in ["0", "-1", "many"] {
            let err = AppConfig::from_lookup(lookup(&[("CLOWEE_DB_MAX_CONNECTIONS", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(_)));
        }
    }
}
