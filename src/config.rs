//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL; the in-memory backend is used when absent
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// How often the retention sweep runs
    pub retention_sweep_interval: Duration,

    /// Changelog settings
    pub settings: Settings,
}

/// Changelog settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Public path of the changelog listing
    pub changelog_path: String,

    pub tracking: TrackingSettings,

    /// Events older than this many days are purged; 0 keeps everything
    pub event_retention_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            changelog_path: DEFAULT_CHANGELOG_PATH.to_string(),
            tracking: TrackingSettings::default(),
            event_retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Per-family producer switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingSettings {
    pub track_content: bool,
    pub track_modules: bool,
    pub track_users: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            track_content: true,
            track_modules: true,
            track_users: true,
        }
    }
}

const DEFAULT_CHANGELOG_PATH: &str = "/changelog";
const DEFAULT_RETENTION_DAYS: u32 = 365;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // The in-memory backend is for development only
        if database_url.is_none() && environment == "production" {
            return Err(ConfigError::MissingEnv("DATABASE_URL"));
        }

        let log_json = env::var("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let sweep_secs: u64 = env::var("RETENTION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RETENTION_SWEEP_INTERVAL_SECS"))?;
        if sweep_secs == 0 {
            return Err(ConfigError::InvalidValue("RETENTION_SWEEP_INTERVAL_SECS"));
        }

        let changelog_path = normalize_path(
            &env::var("CHANGELOG_PATH").unwrap_or_else(|_| DEFAULT_CHANGELOG_PATH.to_string()),
        )
        .ok_or(ConfigError::InvalidValue("CHANGELOG_PATH"))?;

        let event_retention_days = env::var("EVENT_RETENTION_DAYS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_DAYS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("EVENT_RETENTION_DAYS"))?;

        let tracking = TrackingSettings {
            track_content: bool_var("TRACK_CONTENT", true)?,
            track_modules: bool_var("TRACK_MODULES", true)?,
            track_users: bool_var("TRACK_USERS", true)?,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            log_json,
            retention_sweep_interval: Duration::from_secs(sweep_secs),
            settings: Settings {
                changelog_path,
                tracking,
                event_retention_days,
            },
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

/// Accepts true/false, 1/0, yes/no, on/off
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// First path segments owned by the service itself
const RESERVED_SEGMENTS: &[&str] = &["health", "api"];

/// Leading slash, no trailing slash. The root path, reserved prefixes and
/// route parameter syntax (`:name`, `*rest`) are not allowed.
pub fn normalize_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }

    let first = trimmed.split('/').next().unwrap_or_default();
    if RESERVED_SEGMENTS.contains(&first) {
        return None;
    }
    let route_syntax = |segment: &str| {
        segment.is_empty() || segment.starts_with(':') || segment.starts_with('*')
    };
    if trimmed.split('/').any(route_syntax) {
        return None;
    }

    Some(format!("/{}", trimmed))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
