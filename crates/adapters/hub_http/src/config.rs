//! HTTP hub client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the HTTP hub client.
///
/// Where the hub lives (protocol, host, port, credential) is a user setting,
/// not part of this configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpHubConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpHubConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpHubConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
