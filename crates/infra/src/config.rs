//! Process configuration, read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::InventoryError;
use stockroom_inventory::StockRecord;
use stockroom_observability::LogFormat;

use crate::reservation_engine::ReleasePolicy;
use crate::seed;

pub const BIND_ADDR: &str = "BIND_ADDR";
pub const INVENTORY_SEED_FILE: &str = "INVENTORY_SEED_FILE";
pub const REQUIRE_RESERVATION_ID: &str = "REQUIRE_RESERVATION_ID";
pub const REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: `{value}` ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot read seed file {path}: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed data: {0}")]
    Seed(#[from] InventoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` loads the built-in demo catalogue.
    pub seed_file: Option<PathBuf>,
    pub release_policy: ReleasePolicy,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            seed_file: None,
            release_policy: ReleasePolicy::AllowUntracked,
            request_timeout: Duration::from_millis(5_000),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(BIND_ADDR) {
            config.bind_addr = value
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid(BIND_ADDR, &value, e))?;
        }

        config.seed_file = get(INVENTORY_SEED_FILE).map(PathBuf::from);

        if let Some(value) = get(REQUIRE_RESERVATION_ID) {
            config.release_policy = if parse_bool(&value).ok_or_else(|| {
                invalid(REQUIRE_RESERVATION_ID, &value, "expected true or false")
            })? {
                ReleasePolicy::RequireReservation
            } else {
                ReleasePolicy::AllowUntracked
            };
        }

        if let Some(value) = get(REQUEST_TIMEOUT_MS) {
            let ms: u64 = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(REQUEST_TIMEOUT_MS, &value, e))?;
            if ms == 0 {
                return Err(invalid(REQUEST_TIMEOUT_MS, &value, "must be positive"));
            }
            config.request_timeout = Duration::from_millis(ms);
        }

        if let Some(value) = get(LOG_FORMAT) {
            config.log_format = value.parse::<LogFormat>().map_err(|e| invalid(LOG_FORMAT, &value, e))?;
        }

        Ok(config)
    }

    /// Initial stock: the seed file when configured, else the demo catalogue.
    pub fn load_stock(&self, at: DateTime<Utc>) -> Result<Vec<StockRecord>, ConfigError> {
        match &self.seed_file {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedFile {
                    path: path.clone(),
                    source,
                })?;
                Ok(seed::parse_seed_json(&json, at)?)
            }
            None => Ok(seed::demo_catalogue(at)?),
        }
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
