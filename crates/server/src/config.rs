//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//!
//! - `ORDERCAST_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERCAST_PORT` - Listen port (default: `PORT`, then 3000)
//! - `ORDERCAST_LISTENER_BUFFER` - Frames queued per WebSocket listener
//!   before new events are dropped for it (default: 64, minimum 1)
//! - `ORDERCAST_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LISTENER_BUFFER: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Per-listener notification queue capacity
    pub listener_buffer: usize,
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_traces_sample_rate: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            listener_buffer: DEFAULT_LISTENER_BUFFER,
            log_format: LogFormat::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_var(&get, "ORDERCAST_HOST")?.unwrap_or(defaults.host);

        let port = match parse_var(&get, "ORDERCAST_PORT")? {
            Some(port) => port,
            None => parse_var(&get, "PORT")?.unwrap_or(defaults.port),
        };

        let listener_buffer =
            parse_var(&get, "ORDERCAST_LISTENER_BUFFER")?.unwrap_or(defaults.listener_buffer);
        if listener_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ORDERCAST_LISTENER_BUFFER".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let log_format = parse_var(&get, "ORDERCAST_LOG_FORMAT")?.unwrap_or_default();

        let sentry_traces_sample_rate: f32 = parse_var(&get, "SENTRY_TRACES_SAMPLE_RATE")?
            .unwrap_or(defaults.sentry_traces_sample_rate);
        if !(0.0..=1.0).contains(&sentry_traces_sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_TRACES_SAMPLE_RATE".to_string(),
                "must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            listener_buffer,
            log_format,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse an optional variable, naming it in the error on failure.
fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ORDERCAST_HOST", "0.0.0.0"),
            ("ORDERCAST_PORT", "8080"),
            ("ORDERCAST_LISTENER_BUFFER", "4"),
            ("ORDERCAST_LOG_FORMAT", "JSON"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.listener_buffer, 4);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.sentry_dsn.as_deref(), Some("https://key@sentry.example/1"));
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_port_falls_back_to_generic_port() {
        assert_eq!(load(&[("PORT", "9000")]).unwrap().port, 9000);
        assert_eq!(
            load(&[("PORT", "9000"), ("ORDERCAST_PORT", "9001")])
                .unwrap()
                .port,
            9001
        );
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("ORDERCAST_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.sentry_dsn, None);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = load(&[("ORDERCAST_PORT", "seventy")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ORDERCAST_PORT"));

        let err = load(&[("ORDERCAST_LISTENER_BUFFER", "0")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ORDERCAST_LISTENER_BUFFER")
        );

        let err = load(&[("ORDERCAST_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(err.to_string().contains("ORDERCAST_LOG_FORMAT"));

        assert!(load(&[("SENTRY_TRACES_SAMPLE_RATE", "1.5")]).is_err());
    }
}
