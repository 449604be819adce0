//! Process configuration loaded from environment variables.
//!
//! Everything is parsed and validated up front so a bad value fails at
//! startup rather than mid-run.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use steamwatch_core::snowflake::MAX_NODE_ID;
use steamwatch_core::steam_id::SteamId;
use steamwatch_steam::RetryPolicy;

/// A missing or malformed environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining the HTTP listener and the audit writer at
    /// shutdown (default: `5`).
    pub shutdown_timeout_secs: u64,
}

/// Polling settings.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub steam_api_key: String,
    pub steam_id: SteamId,
    /// When set, the scheduler is not started; the HTTP surface still runs.
    pub disabled: bool,
    pub max_retry_count: u32,
    pub retry_delay_secs: u64,
    pub interval_secs: u64,
}

impl TrackerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retry_count,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub snowflake_node_id: i64,
    /// Drop and recreate all tables at startup.
    pub reset_database: bool,
    /// Default level for the console log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `DATABASE_URL`          | required                |
    /// | `SNOWFLAKE_NODE_ID`     | `0`                     |
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `8080`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:8080` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                     |
    /// | `STEAM_API_KEY`         | required                |
    /// | `STEAM_ID`              | required                |
    /// | `RESET_DATABASE`        | `false`                 |
    /// | `DISABLE_TASK`          | `false`                 |
    /// | `MAX_TASK_RETRY_COUNT`  | `3`                     |
    /// | `TASK_RETRY_DELAY_SECS` | `30`                    |
    /// | `TASK_INTERVAL`         | `60`                    |
    /// | `LOG_LEVEL`             | `info`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.required("DATABASE_URL")?;

        let snowflake_node_id: i64 = env.parse_or("SNOWFLAKE_NODE_ID", 0)?;
        if !(0..=MAX_NODE_ID).contains(&snowflake_node_id) {
            return Err(ConfigError::Invalid {
                var: "SNOWFLAKE_NODE_ID",
                reason: format!("must be between 0 and {MAX_NODE_ID}, got {snowflake_node_id}"),
            });
        }

        let log_level = env
            .get("LOG_LEVEL")
            .unwrap_or_else(|| "info".into())
            .to_ascii_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::Invalid {
                var: "LOG_LEVEL",
                reason: format!("must be one of {}, got {log_level}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(Self {
            database_url,
            snowflake_node_id,
            reset_database: env.flag("RESET_DATABASE")?,
            log_level,
            server: ServerConfig::from_env_source(&env)?,
            tracker: TrackerConfig::from_env_source(&env)?,
        })
    }
}

impl ServerConfig {
    fn from_env_source(env: &Env<'_>) -> Result<Self, ConfigError> {
        let host = env.get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        host.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
            var: "HOST",
            reason: e.to_string(),
        })?;

        let port: u16 = env.parse_or("PORT", 8080)?;
        if port == 0 {
            return Err(ConfigError::Invalid {
                var: "PORT",
                reason: "must be non-zero".into(),
            });
        }

        let cors_origins: Vec<String> = env
            .get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8080".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                reason: format!("'{origin}': {e}"),
            })?;
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env.parse_or("SHUTDOWN_TIMEOUT_SECS", 5)?,
        })
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl TrackerConfig {
    fn from_env_source(env: &Env<'_>) -> Result<Self, ConfigError> {
        let steam_api_key = env.required("STEAM_API_KEY")?;
        let steam_id = env
            .required("STEAM_ID")?
            .parse::<SteamId>()
            .map_err(|e| ConfigError::Invalid {
                var: "STEAM_ID",
                reason: e.to_string(),
            })?;

        let max_retry_count: u32 = env.parse_or("MAX_TASK_RETRY_COUNT", 3)?;
        if max_retry_count < 1 {
            return Err(ConfigError::Invalid {
                var: "MAX_TASK_RETRY_COUNT",
                reason: "must be at least 1".into(),
            });
        }

        let interval_secs: u64 = env.parse_or("TASK_INTERVAL", 60)?;
        if interval_secs < 1 {
            return Err(ConfigError::Invalid {
                var: "TASK_INTERVAL",
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(Self {
            steam_api_key,
            steam_id,
            disabled: env.flag("DISABLE_TASK")?,
            max_retry_count,
            retry_delay_secs: env.parse_or("TASK_RETRY_DELAY_SECS", 30)?,
            interval_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Typed accessors over a variable lookup. Empty values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.get(var).ok_or(ConfigError::Missing(var))
    }

    fn parse_or<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(var) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: format!("'{raw}': {e}"),
            }),
        }
    }

    fn flag(&self, var: &'static str) -> Result<bool, ConfigError> {
        match self.get(var).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(false),
            Some(v) => match v.as_str() {
                "1" | "t" | "true" | "yes" => Ok(true),
                "0" | "f" | "false" | "no" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    var,
                    reason: format!("'{v}' is not a boolean"),
                }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
