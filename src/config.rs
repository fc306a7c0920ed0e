//! Environment-driven configuration for the two pipeline steps.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOCATIONS_FILE: &str = "locations.json";
const DEFAULT_SNAPSHOT_DIR: &str = "data";
const DEFAULT_TABLE: &str = "weather_history_forecast";
const DEFAULT_SCHEMA: &str = "bronze_data";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidVar {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Settings for the extract step (fetch + snapshot).
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub api_key: String,
    pub snapshot_time: Option<String>,
    pub locations_path: PathBuf,
    pub snapshot_dir: PathBuf,
    pub http_timeout: Duration,
}

impl ExtractConfig {
    /// Reads `TOMORROW_API_KEY` (required), `SNAPSHOT_TIME`, `LOCATIONS_FILE`,
    /// `SNAPSHOT_DIR` and `HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required("TOMORROW_API_KEY")?,
            snapshot_time: optional("SNAPSHOT_TIME"),
            locations_path: optional("LOCATIONS_FILE")
                .unwrap_or_else(|| DEFAULT_LOCATIONS_FILE.to_string())
                .into(),
            snapshot_dir: optional("SNAPSHOT_DIR")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_DIR.to_string())
                .into(),
            http_timeout: Duration::from_secs(parsed_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Settings for the load step (upsert into Postgres).
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub postgres_uri: String,
    pub table: String,
    pub schema: String,
}

impl LoadConfig {
    /// Reads `POSTGRES_URI` (required), `TABLE` and `SCHEMA`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            postgres_uri: required("POSTGRES_URI")?,
            table: optional("TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            schema: optional("SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parsed_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e| ConfigError::InvalidVar {
            name,
            value,
            source: e,
        }),
    }
}
