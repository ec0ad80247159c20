//! Hub backend selected by configuration.

use homebutler_adapter_hub_http::{HttpHub, HttpHubError};
use homebutler_adapter_virtual::VirtualHub;
use homebutler_app::ports::HubApi;
use homebutler_domain::envelope::ServiceCall;
use homebutler_domain::error::HubError;
use homebutler_domain::hub::{HubServiceDomain, HubState};
use homebutler_domain::settings::ConnectionSettings;

use crate::config::{HubBackend, HubConfig};

/// The hub the companion talks to.
pub enum Hub {
    Virtual(VirtualHub),
    Http(HttpHub),
}

impl Hub {
    /// Build the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &HubConfig) -> Result<Self, HttpHubError> {
        Ok(match config.backend {
            HubBackend::Virtual => Self::Virtual(VirtualHub::default()),
            HubBackend::Http => Self::Http(HttpHub::new(&config.http)?),
        })
    }
}

impl HubApi for Hub {
    fn configure(&mut self, settings: &ConnectionSettings) {
        match self {
            Self::Virtual(hub) => hub.configure(settings),
            Self::Http(hub) => hub.configure(settings),
        }
    }

    async fn fetch_states(&self) -> Result<Vec<HubState>, HubError> {
        match self {
            Self::Virtual(hub) => hub.fetch_states().await,
            Self::Http(hub) => hub.fetch_states().await,
        }
    }

    async fn fetch_services(&self) -> Result<Vec<HubServiceDomain>, HubError> {
        match self {
            Self::Virtual(hub) => hub.fetch_services().await,
            Self::Http(hub) => hub.fetch_services().await,
        }
    }

    async fn call_service(&self, call: &ServiceCall) -> Result<Vec<HubState>, HubError> {
        match self {
            Self::Virtual(hub) => hub.call_service(call).await,
            Self::Http(hub) => hub.call_service(call).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_virtual_hub_by_default() {
        let hub = Hub::from_config(&HubConfig::default()).unwrap();
        assert!(matches!(hub, Hub::Virtual(_)));
    }

    #[test]
    fn should_build_http_hub_when_selected() {
        let config = HubConfig {
            backend: HubBackend::Http,
            ..HubConfig::default()
        };
        let hub = Hub::from_config(&config).unwrap();
        assert!(matches!(hub, Hub::Http(_)));
    }

    #[tokio::test]
    async fn should_dispatch_to_virtual_backend() {
        let hub = Hub::from_config(&HubConfig::default()).unwrap();
        let states = hub.fetch_states().await.unwrap();
        assert!(states.iter().any(|state| state.entity_id == "light.ceiling"));
    }
}
