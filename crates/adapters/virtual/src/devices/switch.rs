//! Virtual switch — responds to `turn_on`, `turn_off`, `toggle`.

use std::sync::Mutex;

use homebutler_domain::device::Device;
use homebutler_domain::hub::HubState;

use super::lock;

/// A simulated switch that can be turned on and off.
pub struct VirtualSwitch {
    entity_id: String,
    name: String,
    on: Mutex<bool>,
}

impl VirtualSwitch {
    #[must_use]
    pub fn new(entity_id: &str, name: &str, on: bool) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            on: Mutex::new(on),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn state(&self) -> HubState {
        let on = *lock(&self.on);
        Device::builder()
            .id(self.entity_id.as_str())
            .friendly_name(&self.name)
            .state(if on { "on" } else { "off" })
            .build()
            .into()
    }

    /// Handle a service call, returning the updated state record.
    pub fn handle_service(&self, service: &str) -> Option<HubState> {
        {
            let mut on = lock(&self.on);
            match service {
                "turn_on" => *on = true,
                "turn_off" => *on = false,
                "toggle" => *on = !*on,
                _ => return None,
            }
        }
        Some(self.state())
    }
}
