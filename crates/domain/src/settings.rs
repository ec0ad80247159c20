//! Connection settings — where the hub lives and how to authenticate.
//!
//! Settings are persisted by the host as JSON items of the form
//! `{"name": "<value>"}`, one per key.

use serde::Deserialize;

use crate::error::SettingsError;

pub const PROTOCOL_KEY: &str = "protocol";
pub const HOST_KEY: &str = "host";
pub const PORT_KEY: &str = "port";
pub const CREDENTIAL_KEY: &str = "credential";

/// Resolved connection parameters of the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub protocol: String,
    pub host: String,
    pub port: String,
    /// Opaque bearer credential.
    pub credential: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "localhost".to_string(),
            port: "443".to_string(),
            credential: String::new(),
        }
    }
}

impl ConnectionSettings {
    /// Base URL of the hub API, e.g. `https://localhost:443/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/api", self.protocol, self.host, self.port)
    }
}

#[derive(Deserialize)]
struct SettingItem {
    name: String,
}

/// Extract the value of a persisted setting item.
///
/// Returns `Ok(None)` when the item is absent or its value is empty, so the
/// caller falls back to the default.
///
/// # Errors
///
/// Returns [`SettingsError::Malformed`] when the item is not
/// `{"name": "<value>"}`.
pub fn parse_setting_item(
    key: &'static str,
    raw: Option<&str>,
) -> Result<Option<String>, SettingsError> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let item: SettingItem =
        serde_json::from_str(raw).map_err(|source| SettingsError::Malformed { key, source })?;
    Ok(Some(item.name).filter(|name| !name.is_empty()))
}
