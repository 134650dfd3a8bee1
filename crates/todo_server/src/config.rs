//! Server configuration loaded from the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | Listen address |
//! | `PORT` | `8000` | Listen port |
//! | `DATABASE_PATH` | `todos.sqlite3` | SQLite file, or `:memory:` |
//! | `LOG_LEVEL` | `debug` / `info` by build mode | `trace\|debug\|info\|warn\|error` |
//! | `LOG_DIR` | unset (stderr) | Absolute directory for rolling log files |
//!
//! A `.env` file in the working directory is honored by the binary.

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use todo_core::default_log_level;
use todo_core::logging::normalize_level;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_PATH: &str = "todos.sqlite3";
const IN_MEMORY_MARKER: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Where task records are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
    pub log_level: &'static str,
    pub log_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE_PATH)),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match read("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("`{raw}` is not a port number: {err}"),
            })?,
            None => defaults.port,
        };

        let database = match read("DATABASE_PATH") {
            Some(raw) if raw == IN_MEMORY_MARKER => DatabaseLocation::InMemory,
            Some(raw) => DatabaseLocation::File(PathBuf::from(raw)),
            None => defaults.database,
        };

        let log_level = match read("LOG_LEVEL") {
            Some(raw) => normalize_level(&raw).map_err(|message| ConfigError::InvalidValue {
                key: "LOG_LEVEL",
                message,
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            host: read("HOST").unwrap_or(defaults.host),
            port,
            database,
            log_level,
            log_dir: read("LOG_DIR"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
