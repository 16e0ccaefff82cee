//! Configuration module
//!
//! `AppConfig` is read once from a TOML file at startup and handed to the
//! constructors that need it. Every section and field has a default, so a
//! partial file (or none at all) is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::HubSettings;
use crate::infrastructure::DatabaseConfig;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "OCPI_HUB_CONFIG";
/// Environment variable overriding `[database] url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL partners reach the hub on; defaults to `http://{host}:{port}`
    pub public_url: Option<String>,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: None,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
        }
    }
}

/// Protocol version and the hub's own party identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcpiConfig {
    pub version: String,
    pub party_id: String,
    pub country_code: String,
    pub business_name: String,
}

impl Default for OcpiConfig {
    fn default() -> Self {
        Self {
            version: "2.3".to_string(),
            party_id: "HUB".to_string(),
            country_code: "US".to_string(),
            business_name: "ChargeSphere Hub".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Deadline for a single partner directory call; 0 disables it
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub ocpi: OcpiConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Read, parse and validate `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&raw)?.with_env_overrides())
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ocpi.version.trim().is_empty() {
            return Err(ConfigError::Invalid("ocpi.version must not be empty".into()));
        }
        if self.ocpi.party_id.chars().count() != 3 {
            return Err(ConfigError::Invalid(
                "ocpi.party_id must be 3 characters".into(),
            ));
        }
        if self.ocpi.country_code.chars().count() != 2 {
            return Err(ConfigError::Invalid(
                "ocpi.country_code must be 2 characters".into(),
            ));
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Externally reachable base URL, without trailing slash.
    pub fn public_url(&self) -> String {
        match &self.server.public_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.server.host, self.server.port),
        }
    }

    /// `{public_url}/ocpi/{version}`
    pub fn hub_url(&self) -> String {
        format!("{}/ocpi/{}", self.public_url(), self.ocpi.version)
    }

    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            hub_url: self.hub_url(),
            version: self.ocpi.version.clone(),
            party_id: self.ocpi.party_id.clone(),
            country_code: self.ocpi.country_code.clone(),
            business_name: self.ocpi.business_name.clone(),
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
        }
    }

    pub fn store_timeout(&self) -> Option<Duration> {
        match self.store.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// `<config dir>/ocpi-hub/config.toml`, e.g. `~/.config/ocpi-hub/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocpi-hub")
        .join("config.toml")
}

/// `OCPI_HUB_CONFIG` if set, otherwise [`default_config_path`].
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.listen_address(), "0.0.0.0:8080");
        assert_eq!(config.hub_url(), "http://0.0.0.0:8080/ocpi/2.3");
        assert_eq!(config.store_timeout(), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9090
            public_url = "https://hub.example.com/"

            [ocpi]
            version = "2.2.1"

            [store]
            timeout_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.hub_url(), "https://hub.example.com/ocpi/2.2.1");
        assert_eq!(config.store_timeout(), None);

        let hub = config.hub_settings();
        assert_eq!(hub.party_id, "HUB");
        assert_eq!(hub.country_code, "US");
        assert_eq!(hub.business_name, "ChargeSphere Hub");
    }

    #[test]
    fn invalid_hub_identity_is_rejected() {
        let err = AppConfig::from_toml("[ocpi]\nparty_id = \"HUBX\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_toml("[ocpi]\ncountry_code = \"USA\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = AppConfig::from_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/etc/ocpi-hub.toml")));
        assert_eq!(path, PathBuf::from("/etc/ocpi-hub.toml"));
        assert!(default_config_path().ends_with("ocpi-hub/config.toml"));
    }
}
