//! Configuration management for subsync
//!
//! This module handles loading and validating configuration from
//! environment variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fetcher configuration
    pub fetch: FetchConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// URL date-template configuration
    pub template: TemplateConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string sent with every subscription fetch
    pub user_agent: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Calendar used when expanding dated URL templates
///
/// The upstream free endpoints publish under paths derived from the
/// publisher's calendar day; which timezone that is was never
/// documented, so the choice is explicit here. `Local` matches the
/// historically observed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTimezone {
    #[default]
    Local,
    Utc,
}

/// URL template configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TemplateConfig {
    /// Timezone used to resolve `{yyyy}`/`{MM}`/`{dd}` tokens
    pub timezone: TemplateTimezone,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let request_timeout_secs = std::env::var("SUBSYNC_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let user_agent = std::env::var("SUBSYNC_USER_AGENT")
            .unwrap_or_else(|_| format!("subsync/{}", env!("CARGO_PKG_VERSION")));

        let sqlite_path = std::env::var("SUBSYNC_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/servers.db"))
            .into();

        let timezone = match std::env::var("SUBSYNC_TEMPLATE_TZ").as_deref() {
            Ok("utc") => TemplateTimezone::Utc,
            _ => TemplateTimezone::Local,
        };

        let log_level = std::env::var("SUBSYNC_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("SUBSYNC_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            fetch: FetchConfig {
                request_timeout_secs,
                user_agent,
            },
            database: DatabaseConfig { sqlite_path },
            template: TemplateConfig { timezone },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.fetch.user_agent.is_empty() {
            anyhow::bail!("user_agent must not be empty");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig {
                request_timeout_secs: 30,
                user_agent: format!("subsync/{}", env!("CARGO_PKG_VERSION")),
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/servers.db"),
            },
            template: TemplateConfig::default(),
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.fetch.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_template_timezone_parse() {
        let toml_str = r#"
            [fetch]
            request_timeout_secs = 10
            user_agent = "subsync/test"

            [database]
            sqlite_path = "servers.db"

            [template]
            timezone = "utc"

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.template.timezone, TemplateTimezone::Utc);
        assert!(config.validate().is_ok());
    }
}
