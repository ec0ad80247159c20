//! # homebutler-adapter-hub-http
//!
//! [`HubApi`] implementation talking to the hub's REST API:
//!
//! | Port method | Request |
//! |-------------|---------|
//! | `fetch_states` | `GET {base}/states` |
//! | `fetch_services` | `GET {base}/services` |
//! | `call_service` | `POST {base}/services/{domain}/{service}` |
//!
//! `{base}` is [`ConnectionSettings::base_url`]. Every request carries the
//! credential as a bearer token.
//!
//! ## Dependency rule
//!
//! Depends on `homebutler-app` (port traits) and `homebutler-domain` only.

pub mod config;
pub mod error;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use homebutler_app::ports::HubApi;
use homebutler_domain::envelope::ServiceCall;
use homebutler_domain::error::HubError;
use homebutler_domain::hub::{HubServiceDomain, HubState};
use homebutler_domain::settings::ConnectionSettings;

pub use config::HttpHubConfig;
pub use error::HttpHubError;

/// Hub client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHub {
    client: reqwest::Client,
    base_url: String,
    credential: String,
}

impl HttpHub {
    /// Build a client pointed at the default connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpHubError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &HttpHubConfig) -> Result<Self, HttpHubError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(HttpHubError::Client)?;
        let settings = ConnectionSettings::default();
        Ok(Self {
            client,
            base_url: settings.base_url(),
            credential: settings.credential,
        })
    }

    /// Base URL requests are currently sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.credential)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn read<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, HttpHubError> {
        let response = request.send().await.map_err(HttpHubError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpHubError::Status(status));
        }
        let body = response.bytes().await.map_err(HttpHubError::Transport)?;
        serde_json::from_slice(&body).map_err(HttpHubError::Decode)
    }
}

impl HubApi for HttpHub {
    fn configure(&mut self, settings: &ConnectionSettings) {
        self.base_url = settings.base_url();
        self.credential.clone_from(&settings.credential);
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_states(&self) -> Result<Vec<HubState>, HubError> {
        let states: Vec<HubState> = Self::read(self.request(reqwest::Method::GET, "/states")).await?;
        tracing::debug!(count = states.len(), "fetched hub states");
        Ok(states)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_services(&self) -> Result<Vec<HubServiceDomain>, HubError> {
        let services: Vec<HubServiceDomain> =
            Self::read(self.request(reqwest::Method::GET, "/services")).await?;
        tracing::debug!(count = services.len(), "fetched hub services");
        Ok(services)
    }

    #[tracing::instrument(skip(self, call), fields(domain = %call.domain, service = %call.service))]
    async fn call_service(&self, call: &ServiceCall) -> Result<Vec<HubState>, HubError> {
        let path = format!("/services/{}/{}", call.domain, call.service);
        let request = self
            .request(reqwest::Method::POST, &path)
            .json(&call.payload);
        let changed: Vec<HubState> = Self::read(request).await?;
        tracing::debug!(count = changed.len(), "service call answered");
        Ok(changed)
    }
}
