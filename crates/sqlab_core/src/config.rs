//! Facade configuration.
//!
//! # Responsibility
//! - Hold the connection string and per-connection tunables.
//! - Load overrides from `SQLAB_*` environment variables.
//!
//! # Invariants
//! - Missing fields fall back to `LabConfig::default()` values.

use crate::db::{ConnectionSettings, DbLocation, DbResult};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DATABASE_URL_ENV: &str = "SQLAB_DATABASE_URL";
pub const BUSY_TIMEOUT_ENV: &str = "SQLAB_BUSY_TIMEOUT_MS";
pub const FOREIGN_KEYS_ENV: &str = "SQLAB_FOREIGN_KEYS";

const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Connection string; see `DbLocation::parse` for accepted forms.
    pub database_url: String,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
        }
    }
}

impl LabConfig {
    /// Config for `database_url` with default tunables.
    pub fn for_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by any `SQLAB_*` variables present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_ENV) {
            config.database_url = url;
        }
        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV) {
            config.busy_timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: BUSY_TIMEOUT_ENV,
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = lookup(FOREIGN_KEYS_ENV) {
            config.foreign_keys = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: FOREIGN_KEYS_ENV,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn location(&self) -> DbResult<DbLocation> {
        DbLocation::parse(&self.database_url)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            foreign_keys: self.foreign_keys,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
