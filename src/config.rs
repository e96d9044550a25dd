//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use crate::listeners::{ReconcilerSettings, DEFAULT_IMMINENCE_MINUTES, MAX_IMMINENCE_MINUTES};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Postgres NOTIFY channel carrying domain events
    pub event_channel: String,

    /// Publish times shifted closer than this to now are drafted
    pub schedule_imminence_minutes: i64,

    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let event_channel =
            lookup("EVENT_CHANNEL").unwrap_or_else(|| "domain_events".to_string());
        if event_channel.is_empty() {
            return Err(ConfigError::InvalidValue("EVENT_CHANNEL"));
        }

        let schedule_imminence_minutes = match lookup("SCHEDULE_IMMINENCE_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| (0..=MAX_IMMINENCE_MINUTES).contains(minutes))
                .ok_or(ConfigError::InvalidValue("SCHEDULE_IMMINENCE_MINUTES"))?,
            None => DEFAULT_IMMINENCE_MINUTES,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            event_channel,
            schedule_imminence_minutes,
            log_format,
        })
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings::with_imminence_minutes(self.schedule_imminence_minutes)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
