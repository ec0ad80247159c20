//! Hub client — cached hub inventory over the [`HubApi`] port.
//!
//! The cache follows a stale-but-available policy: a failed refresh leaves
//! the previous inventory in place. No error ever leaves this component;
//! failures are logged and reported as `false` / `None`.

use std::collections::BTreeMap;

use homebutler_domain::device::Device;
use homebutler_domain::envelope::ServiceCall;
use homebutler_domain::hub::HubState;
use homebutler_domain::settings::ConnectionSettings;
use homebutler_domain::time::{Timestamp, now, seconds_since};

use crate::ports::HubApi;

/// Cached view of the hub: devices and service names per domain.
pub struct HubClient<H> {
    api: H,
    devices: BTreeMap<String, Vec<Device>>,
    services: BTreeMap<String, Vec<String>>,
    last_synced_at: Option<Timestamp>,
}

impl<H: HubApi> HubClient<H> {
    /// Create a client with an empty cache.
    pub fn new(api: H) -> Self {
        Self {
            api,
            devices: BTreeMap::new(),
            services: BTreeMap::new(),
            last_synced_at: None,
        }
    }

    /// Point the underlying API at a new hub.
    pub fn configure(&mut self, settings: &ConnectionSettings) {
        tracing::info!(url = %settings.base_url(), "hub client configured");
        self.api.configure(settings);
    }

    /// Refresh devices and services from the hub.
    ///
    /// Both reads are issued; if either fails the cache is left untouched
    /// and `false` is returned.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&mut self) -> bool {
        let states = self.api.fetch_states().await;
        let services = self.api.fetch_services().await;

        let (states, services) = match (states, services) {
            (Ok(states), Ok(services)) => (states, services),
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!(
                    error = %err,
                    age_secs = self.inventory_age_secs(),
                    "hub sync failed, keeping cached inventory"
                );
                return false;
            }
        };

        self.services = services
            .into_iter()
            .map(|entry| {
                let names = entry.service_names();
                (entry.domain, names)
            })
            .collect();

        let mut devices: BTreeMap<String, Vec<Device>> = BTreeMap::new();
        for state in states {
            let device = state.into_device();
            let Some(domain) = device.domain().map(str::to_string) else {
                tracing::debug!(entity_id = %device.id, "skipping state without domain");
                continue;
            };
            devices.entry(domain).or_default().push(device);
        }
        self.devices = devices;
        self.last_synced_at = Some(now());

        tracing::info!(
            domains = self.devices.len(),
            service_domains = self.services.len(),
            "hub inventory refreshed"
        );
        true
    }

    /// Forward a service call to the hub.
    ///
    /// Returns the states the hub reports after the call, or `None` when the
    /// call failed (logged, never retried).
    #[tracing::instrument(
        skip(self, call),
        fields(domain = %call.domain, service = %call.service, entity_id = %call.payload.entity_id)
    )]
    pub async fn call_service(&self, call: &ServiceCall) -> Option<Vec<HubState>> {
        match self.api.call_service(call).await {
            Ok(states) => Some(states),
            Err(err) => {
                tracing::error!(error = %err, "service call failed");
                None
            }
        }
    }

    /// Cached devices, grouped by domain.
    #[must_use]
    pub fn devices(&self) -> &BTreeMap<String, Vec<Device>> {
        &self.devices
    }

    /// Cached service names, grouped by domain.
    #[must_use]
    pub fn services(&self) -> &BTreeMap<String, Vec<String>> {
        &self.services
    }

    /// When the cache was last refreshed successfully.
    #[must_use]
    pub fn last_synced_at(&self) -> Option<Timestamp> {
        self.last_synced_at
    }

    /// Seconds since the last successful refresh, `None` before the first.
    #[must_use]
    pub fn inventory_age_secs(&self) -> Option<i64> {
        self.last_synced_at.map(seconds_since)
    }

    /// The underlying API adapter.
    #[must_use]
    pub fn api(&self) -> &H {
        &self.api
    }
}
