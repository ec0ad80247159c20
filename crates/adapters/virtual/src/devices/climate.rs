//! Virtual thermostat — `set_hvac_mode`, `turn_on`, `turn_off`.

use std::sync::Mutex;

use homebutler_domain::device::Device;
use homebutler_domain::hub::HubState;

use super::lock;

/// HVAC modes the simulated thermostat accepts.
pub const HVAC_MODES: [&str; 4] = ["off", "heat", "cool", "heat_cool"];

/// A simulated climate controller with fixed readings.
pub struct VirtualClimate {
    entity_id: String,
    name: String,
    current_temperature: f64,
    current_humidity: i64,
    mode: Mutex<String>,
}

impl VirtualClimate {
    #[must_use]
    pub fn new(entity_id: &str, name: &str, mode: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            current_temperature: 21.5,
            current_humidity: 40,
            mode: Mutex::new(mode.to_string()),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Current state record; the state is the HVAC mode.
    #[must_use]
    pub fn state(&self) -> HubState {
        let mode = lock(&self.mode).clone();
        Device::builder()
            .id(self.entity_id.as_str())
            .friendly_name(&self.name)
            .attribute("current_temperature", self.current_temperature)
            .attribute("current_humidity", self.current_humidity)
            .state(mode)
            .build()
            .into()
    }

    /// Handle a service call, returning the updated state record.
    ///
    /// `set_hvac_mode` needs an `hvac_mode` field naming a known mode.
    pub fn handle_service(
        &self,
        service: &str,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> Option<HubState> {
        let next = match service {
            "set_hvac_mode" => data
                .get("hvac_mode")
                .and_then(serde_json::Value::as_str)
                .filter(|mode| HVAC_MODES.contains(mode))?,
            "turn_on" => "heat_cool",
            "turn_off" => "off",
            _ => return None,
        };
        *lock(&self.mode) = next.to_string();
        Some(self.state())
    }
}
