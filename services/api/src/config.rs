//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::Duration;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    /// Lifetime of a login session, both server-side and as the cookie Max-Age.
    pub session_ttl: Duration,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://project.db?mode=rwc".to_string());
        if database_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 5u32)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Session Settings ---
        let ttl_hours = parse_or("SESSION_TTL_HOURS", lookup("SESSION_TTL_HOURS"), 720i64)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_HOURS".to_string(),
                "must be a positive number of hours".to_string(),
            ));
        }
        let cookie_secure = parse_or("COOKIE_SECURE", lookup("COOKIE_SECURE"), true)?;

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            session_ttl: Duration::hours(ttl_hours),
            cookie_secure,
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.database_url, "sqlite://project.db?mode=rwc");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.session_ttl, Duration::hours(720));
        assert!(config.cookie_secure);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("SESSION_TTL_HOURS", "2"),
            ("COOKIE_SECURE", "false"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl, Duration::hours(2));
        assert!(!config.cookie_secure);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("SESSION_TTL_HOURS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "SESSION_TTL_HOURS"));

        let err = load(&[("SESSION_TTL_HOURS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));

        let err = load(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));
    }
}
