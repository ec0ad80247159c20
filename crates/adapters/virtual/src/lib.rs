//! # homebutler-adapter-virtual
//!
//! Simulated home-automation hub implementing the [`HubApi`] port, used for
//! demos and tests when no real hub is around.
//!
//! ## Provided entities
//!
//! | Entity ID | Name | Services |
//! |-----------|------|----------|
//! | `light.ceiling` | Ceiling | `turn_on` / `turn_off` / `toggle` |
//! | `light.desk_lamp` | Desk Lamp | `turn_on` / `turn_off` / `toggle` |
//! | `light.porch` | Porch | `turn_on` / `turn_off` / `toggle` |
//! | `switch.coffee_maker` | Coffee Maker | `turn_on` / `turn_off` / `toggle` |
//! | `switch.fan` | Fan | `turn_on` / `turn_off` / `toggle` |
//! | `climate.hall` | Hall | `set_hvac_mode` / `turn_on` / `turn_off` |
//! | `sensor.outside_temperature` | Outside | none |
//! | `group.all_lights` | All Lights | none, derived from the lights |
//!
//! Like the real hub, a service call answers with the changed entity plus
//! the `group.all_lights` aggregate when a light changed.
//!
//! ## Dependency rule
//!
//! Depends on `homebutler-app` (port traits) and `homebutler-domain` only.

mod devices;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;

use homebutler_app::ports::HubApi;
use homebutler_domain::device::{AttributeValue, Device, domain_of};
use homebutler_domain::envelope::ServiceCall;
use homebutler_domain::error::HubError;
use homebutler_domain::hub::{HubServiceDomain, HubState};
use homebutler_domain::settings::ConnectionSettings;

use devices::{VirtualClimate, VirtualDevice, VirtualLight, VirtualSensor, VirtualSwitch};

pub const ALL_LIGHTS_ID: &str = "group.all_lights";

/// Returned as the source of [`HubError::Unreachable`] while offline.
#[derive(Debug, thiserror::Error)]
#[error("virtual hub is offline")]
pub struct Offline;

struct Inner {
    devices: Vec<VirtualDevice>,
    online: AtomicBool,
}

/// In-memory hub. Clones share the same devices and online flag.
#[derive(Clone)]
pub struct VirtualHub {
    inner: Arc<Inner>,
}

impl Default for VirtualHub {
    fn default() -> Self {
        Self::with_devices(vec![
            VirtualDevice::Light(VirtualLight::new("light.ceiling", "Ceiling", true)),
            VirtualDevice::Light(VirtualLight::new("light.desk_lamp", "Desk Lamp", false)),
            VirtualDevice::Light(VirtualLight::new("light.porch", "Porch", false)),
            VirtualDevice::Switch(VirtualSwitch::new("switch.coffee_maker", "Coffee Maker", false)),
            VirtualDevice::Switch(VirtualSwitch::new("switch.fan", "Fan", true)),
            VirtualDevice::Climate(VirtualClimate::new("climate.hall", "Hall", "heat")),
            VirtualDevice::Sensor(VirtualSensor::new(
                "sensor.outside_temperature",
                "Outside",
                12.5,
            )),
        ])
    }
}

impl VirtualHub {
    fn with_devices(devices: Vec<VirtualDevice>) -> Self {
        Self {
            inner: Arc::new(Inner {
                devices,
                online: AtomicBool::new(true),
            }),
        }
    }

    /// Take the hub offline (or back online). Offline, every call fails
    /// with [`HubError::Unreachable`].
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
        tracing::info!(online, "virtual hub availability changed");
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), HubError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(HubError::Unreachable(Box::new(Offline)))
        }
    }

    fn find(&self, entity_id: &str) -> Option<&VirtualDevice> {
        self.inner
            .devices
            .iter()
            .find(|device| device.entity_id() == entity_id)
    }

    fn all_lights(&self) -> HubState {
        let members: Vec<&str> = self
            .inner
            .devices
            .iter()
            .filter(|device| matches!(device, VirtualDevice::Light(_)))
            .map(VirtualDevice::entity_id)
            .collect();
        let any_lit = self.inner.devices.iter().any(VirtualDevice::is_lit);
        Device::builder()
            .id(ALL_LIGHTS_ID)
            .friendly_name("All Lights")
            .attribute("entity_id", AttributeValue::Json(json!(members)))
            .state(if any_lit { "on" } else { "off" })
            .build()
            .into()
    }
}

fn schema(services: &[&str]) -> serde_json::Map<String, serde_json::Value> {
    services
        .iter()
        .map(|name| ((*name).to_string(), json!({})))
        .collect()
}

impl HubApi for VirtualHub {
    fn configure(&mut self, settings: &ConnectionSettings) {
        tracing::debug!(url = %settings.base_url(), "virtual hub ignores connection settings");
    }

    async fn fetch_states(&self) -> Result<Vec<HubState>, HubError> {
        self.ensure_online()?;
        let mut states: Vec<HubState> = self.inner.devices.iter().map(VirtualDevice::state).collect();
        states.push(self.all_lights());
        Ok(states)
    }

    async fn fetch_services(&self) -> Result<Vec<HubServiceDomain>, HubError> {
        self.ensure_online()?;
        let on_off = ["turn_on", "turn_off", "toggle"];
        Ok(vec![
            HubServiceDomain {
                domain: "light".to_string(),
                services: schema(&on_off),
            },
            HubServiceDomain {
                domain: "switch".to_string(),
                services: schema(&on_off),
            },
            HubServiceDomain {
                domain: "climate".to_string(),
                services: schema(&["set_hvac_mode", "turn_on", "turn_off"]),
            },
            HubServiceDomain {
                domain: "group".to_string(),
                services: schema(&["reload"]),
            },
        ])
    }

    async fn call_service(&self, call: &ServiceCall) -> Result<Vec<HubState>, HubError> {
        self.ensure_online()?;
        let entity_id = call.payload.entity_id.as_str();
        let rejected = || HubError::Rejected {
            domain: call.domain.clone(),
            service: call.service.clone(),
            entity_id: entity_id.to_string(),
        };

        let device = self
            .find(entity_id)
            .filter(|device| domain_of(device.entity_id()) == Some(call.domain.as_str()))
            .ok_or_else(rejected)?;
        let changed = device
            .handle_service(&call.service, &call.payload.extra)
            .ok_or_else(rejected)?;
        tracing::debug!(entity_id, service = %call.service, state = %changed.state, "virtual service call");

        let mut states = vec![changed];
        if matches!(device, VirtualDevice::Light(_)) {
            states.push(self.all_lights());
        }
        Ok(states)
    }
}
