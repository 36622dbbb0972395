// src/config.rs

use dotenvy::dotenv;
use std::env;
use thiserror::Error;

/// Deployment indicator that switches the API into read-only mode.
pub const RESTRICTED_ENV: &str = "demo";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub app_env: String,
    /// Fixed for the lifetime of the process.
    pub read_only: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", lookup("PORT"), 8000u16)?;
        let max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 10u32)?;
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".into());
        let read_only = resolve_read_only(&app_env, lookup("READ_ONLY").as_deref())?;

        Ok(Settings {
            database_url,
            host,
            port,
            max_connections,
            app_env,
            read_only,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// An explicit `READ_ONLY` wins; otherwise the restricted deployment turns it on.
pub fn resolve_read_only(app_env: &str, explicit: Option<&str>) -> Result<bool, ConfigError> {
    match explicit.map(|s| s.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            name: "READ_ONLY",
            value: v,
        }),
        None => Ok(app_env.trim().eq_ignore_ascii_case(RESTRICTED_ENV)),
    }
}
