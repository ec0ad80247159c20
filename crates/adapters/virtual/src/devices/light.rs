//! Virtual light — `turn_on` (with optional `brightness`), `turn_off`, `toggle`.

use std::sync::Mutex;

use homebutler_domain::device::Device;
use homebutler_domain::hub::HubState;

use super::lock;

const FULL_BRIGHTNESS: i64 = 255;

#[derive(Debug, Clone, Copy)]
struct LightState {
    on: bool,
    brightness: i64,
}

/// A simulated dimmable light.
pub struct VirtualLight {
    entity_id: String,
    name: String,
    state: Mutex<LightState>,
}

impl VirtualLight {
    #[must_use]
    pub fn new(entity_id: &str, name: &str, on: bool) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            state: Mutex::new(LightState {
                on,
                brightness: FULL_BRIGHTNESS,
            }),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        lock(&self.state).on
    }

    /// Current state record. Brightness is only reported while lit.
    #[must_use]
    pub fn state(&self) -> HubState {
        let current = *lock(&self.state);
        let builder = Device::builder()
            .id(self.entity_id.as_str())
            .friendly_name(&self.name);
        let builder = if current.on {
            builder.attribute("brightness", current.brightness).state("on")
        } else {
            builder.state("off")
        };
        builder.build().into()
    }

    /// Handle a service call, returning the updated state record.
    pub fn handle_service(
        &self,
        service: &str,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> Option<HubState> {
        {
            let mut state = lock(&self.state);
            match service {
                "turn_on" => {
                    state.on = true;
                    if let Some(brightness) = data.get("brightness").and_then(serde_json::Value::as_i64) {
                        state.brightness = brightness.clamp(0, FULL_BRIGHTNESS);
                    }
                }
                "turn_off" => state.on = false,
                "toggle" => state.on = !state.on,
                _ => return None,
            }
        }
        Some(self.state())
    }
}
