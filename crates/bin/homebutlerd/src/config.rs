//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homebutler.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use serde::Deserialize;

use homebutler_adapter_hub_http::HttpHubConfig;
use homebutler_domain::enabled_domains::EnabledDomains;
use homebutler_domain::settings::ConnectionSettings;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which hub the companion talks to.
    pub hub: HubConfig,
    /// Domains mirrored to the client, with their maximum card count.
    pub domains: EnabledDomains,
    /// Connection settings seeded into the settings store at startup.
    pub settings: SettingsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Hub backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubBackend {
    /// Simulated in-process hub.
    #[default]
    Virtual,
    /// Real hub over its REST API.
    Http,
}

impl FromStr for HubBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "virtual" => Ok(Self::Virtual),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Validation(format!(
                "unknown hub backend `{other}`, expected `virtual` or `http`"
            ))),
        }
    }
}

/// Hub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub backend: HubBackend,
    /// HTTP client options, used by the `http` backend.
    #[serde(flatten)]
    pub http: HttpHubConfig,
}

/// Initial connection settings (`protocol`, `host`, `port`, `credential`).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub protocol: String,
    pub host: String,
    pub port: String,
    pub credential: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homebutler.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homebutler.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("HOMEBUTLER_HUB") {
            self.hub.backend = val.parse()?;
        }
        if let Ok(val) = std::env::var("HOMEBUTLER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.is_empty() {
            return Err(ConfigError::Validation(
                "at least one domain must be enabled".to_string(),
            ));
        }
        if let Some((domain, _)) = self.domains.iter().find(|(_, max)| *max == 0) {
            return Err(ConfigError::Validation(format!(
                "domain `{domain}` must allow at least one card"
            )));
        }
        if self.hub.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "hub timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        ConnectionSettings::default().into()
    }
}

impl From<ConnectionSettings> for SettingsConfig {
    fn from(settings: ConnectionSettings) -> Self {
        Self {
            protocol: settings.protocol,
            host: settings.host,
            port: settings.port,
            credential: settings.credential,
        }
    }
}

impl SettingsConfig {
    #[must_use]
    pub fn to_connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            port: self.port.clone(),
            credential: self.credential.clone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homebutlerd=info,homebutler_app=info,homebutler_adapter_virtual=info,\
                     homebutler_adapter_hub_http=info,homebutler_adapter_memory=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
