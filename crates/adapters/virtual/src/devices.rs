//! Simulated devices — lights, switches, a thermostat and a sensor.
//!
//! Every device owns its entity id and a `Mutex` around its mutable state
//! so the hub can answer service calls through a shared reference.

mod climate;
mod light;
mod sensor;
mod switch;

pub use climate::VirtualClimate;
pub use light::VirtualLight;
pub use sensor::VirtualSensor;
pub use switch::VirtualSwitch;

use std::sync::{Mutex, MutexGuard, PoisonError};

use homebutler_domain::hub::HubState;

/// Wrapper enum for the concrete simulated device types.
pub enum VirtualDevice {
    Light(VirtualLight),
    Switch(VirtualSwitch),
    Climate(VirtualClimate),
    Sensor(VirtualSensor),
}

impl VirtualDevice {
    /// Entity id of the wrapped device.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Light(d) => d.entity_id(),
            Self::Switch(d) => d.entity_id(),
            Self::Climate(d) => d.entity_id(),
            Self::Sensor(d) => d.entity_id(),
        }
    }

    /// Current state record, as `GET /states` reports it.
    #[must_use]
    pub fn state(&self) -> HubState {
        match self {
            Self::Light(d) => d.state(),
            Self::Switch(d) => d.state(),
            Self::Climate(d) => d.state(),
            Self::Sensor(d) => d.state(),
        }
    }

    /// Whether the device is a light that is currently on.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        matches!(self, Self::Light(d) if d.is_on())
    }

    /// Apply a service call. `None` when the device does not support it.
    pub fn handle_service(
        &self,
        service: &str,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> Option<HubState> {
        match self {
            Self::Light(d) => d.handle_service(service, data),
            Self::Switch(d) => d.handle_service(service),
            Self::Climate(d) => d.handle_service(service, data),
            Self::Sensor(_) => None,
        }
    }
}

/// Lock a device state, recovering the value of a poisoned mutex.
fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
