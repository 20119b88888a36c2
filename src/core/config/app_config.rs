//! Process configuration read from `PVWATCH_*` environment variables.
//!
//! A `.env` file is loaded first by `main`. Unparsable values fall back to their
//! default with a warning; the assembled config is then validated as a whole.

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use tracing::warn;
use validator::Validate;

use crate::domain::chart::dto::chart_query_request::DEFAULT_QUERY_TYPE;
use crate::domain::chart::service::diurnal_splitter::DiurnalBoundary;

pub const ENV_SERVER_ADDR: &str = "PVWATCH_SERVER_ADDR";
pub const ENV_BACKEND_URL: &str = "PVWATCH_BACKEND_URL";
pub const ENV_BACKEND_TOKEN: &str = "PVWATCH_BACKEND_TOKEN";
pub const ENV_TIMEZONE: &str = "PVWATCH_TIMEZONE";
pub const ENV_DAY_START_HOUR: &str = "PVWATCH_DAY_START_HOUR";
pub const ENV_NIGHT_START_HOUR: &str = "PVWATCH_NIGHT_START_HOUR";
pub const ENV_QUERY_TYPE: &str = "PVWATCH_QUERY_TYPE";
pub const ENV_LOG_DIR: &str = "PVWATCH_LOG_DIR";
pub const ENV_DEBUG_MODE: &str = "PVWATCH_DEBUG_MODE";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080/api/search";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    pub server_addr: SocketAddr,
    #[validate(url)]
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub timezone: Tz,
    #[validate(nested)]
    pub boundary: DiurnalBoundary,
    #[validate(length(min = 1))]
    pub query_type: String,
    #[validate(length(min = 1))]
    pub log_dir: String,
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_token: None,
            timezone: Tz::UTC,
            boundary: DiurnalBoundary::default(),
            query_type: DEFAULT_QUERY_TYPE.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            debug_mode: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            server_addr: parse_or(ENV_SERVER_ADDR, get(ENV_SERVER_ADDR), defaults.server_addr),
            backend_url: get(ENV_BACKEND_URL).unwrap_or(defaults.backend_url),
            backend_token: get(ENV_BACKEND_TOKEN),
            timezone: parse_or(ENV_TIMEZONE, get(ENV_TIMEZONE), defaults.timezone),
            boundary: DiurnalBoundary {
                day_start_hour: parse_or(
                    ENV_DAY_START_HOUR,
                    get(ENV_DAY_START_HOUR),
                    defaults.boundary.day_start_hour,
                ),
                night_start_hour: parse_or(
                    ENV_NIGHT_START_HOUR,
                    get(ENV_NIGHT_START_HOUR),
                    defaults.boundary.night_start_hour,
                ),
            },
            query_type: get(ENV_QUERY_TYPE).unwrap_or(defaults.query_type),
            log_dir: get(ENV_LOG_DIR).unwrap_or(defaults.log_dir),
            debug_mode: get(ENV_DEBUG_MODE)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.debug_mode),
        };

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using default", key, v);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.server_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.timezone, Tz::UTC);
        assert_eq!(cfg.boundary, DiurnalBoundary::default());
        assert_eq!(cfg.query_type, "avgTotal");
        assert!(!cfg.debug_mode);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config_from(&[
            (ENV_SERVER_ADDR, "127.0.0.1:9000"),
            (ENV_BACKEND_URL, "https://search.example.com/api/search"),
            (ENV_BACKEND_TOKEN, "abc"),
            (ENV_TIMEZONE, "Europe/Prague"),
            (ENV_DAY_START_HOUR, "5"),
            (ENV_NIGHT_START_HOUR, "21"),
            (ENV_QUERY_TYPE, "sumTotal"),
            (ENV_LOG_DIR, "/var/log/pvwatch"),
            (ENV_DEBUG_MODE, "TRUE"),
        ])
        .unwrap();

        assert_eq!(cfg.server_addr.port(), 9000);
        assert_eq!(cfg.backend_token.as_deref(), Some("abc"));
        assert_eq!(cfg.timezone, chrono_tz::Europe::Prague);
        assert_eq!(cfg.boundary.day_start_hour, 5);
        assert_eq!(cfg.boundary.night_start_hour, 21);
        assert_eq!(cfg.query_type, "sumTotal");
        assert_eq!(cfg.log_dir, "/var/log/pvwatch");
        assert!(cfg.debug_mode);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = config_from(&[
            (ENV_SERVER_ADDR, "not-an-addr"),
            (ENV_TIMEZONE, "Mars/Olympus"),
            (ENV_DAY_START_HOUR, "six"),
        ])
        .unwrap();
        assert_eq!(cfg.server_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.timezone, Tz::UTC);
        assert_eq!(cfg.boundary.day_start_hour, 6);
    }

    #[test]
    fn blank_token_is_none() {
        let cfg = config_from(&[(ENV_BACKEND_TOKEN, "   ")]).unwrap();
        assert!(cfg.backend_token.is_none());
    }

    #[test]
    fn inverted_boundary_is_rejected() {
        assert!(config_from(&[(ENV_DAY_START_HOUR, "22"), (ENV_NIGHT_START_HOUR, "6")]).is_err());
    }

    #[test]
    fn malformed_backend_url_is_rejected() {
        assert!(config_from(&[(ENV_BACKEND_URL, "search-host")]).is_err());
    }
}
