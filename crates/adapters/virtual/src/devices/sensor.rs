//! Virtual temperature sensor — read-only, refuses every service call.

use homebutler_domain::device::Device;
use homebutler_domain::hub::HubState;

/// A simulated temperature sensor.
pub struct VirtualSensor {
    entity_id: String,
    name: String,
    temperature: f64,
}

impl VirtualSensor {
    #[must_use]
    pub fn new(entity_id: &str, name: &str, temperature: f64) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            temperature,
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn state(&self) -> HubState {
        Device::builder()
            .id(self.entity_id.as_str())
            .friendly_name(&self.name)
            .attribute("unit_of_measurement", "\u{b0}C")
            .state(self.temperature.to_string())
            .build()
            .into()
    }
}
