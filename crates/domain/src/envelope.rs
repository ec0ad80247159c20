//! Live-channel messages.
//!
//! The client sends [`Envelope`]s to the companion; the companion answers
//! each successful service call with one [`StateUpdate`] per affected
//! device. Exactly one logical command travels per message.

use serde::{Deserialize, Serialize};

use crate::device::{self, Attributes, Device};

/// Command sent from the client to the companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "content", rename_all = "lowercase")]
pub enum Envelope {
    /// Startup handshake; wakes the companion so it opens the channel.
    Wakeup,
    /// Forward a service call to the hub.
    Service(ServiceCall),
    /// Any command this build does not know. Ignored on receipt.
    #[serde(other)]
    Unknown,
}

/// A hub service call: `POST /services/{domain}/{service}` with `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub payload: ServicePayload,
}

/// Body of a service call. `entity_id` is mandatory, anything else
/// (`hvac_mode`, `brightness`, …) is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePayload {
    pub entity_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceCall {
    /// Call `service` on `entity_id` within `domain`, without extra fields.
    #[must_use]
    pub fn new(domain: &str, service: &str, entity_id: &str) -> Self {
        Self {
            domain: domain.to_string(),
            service: service.to_string(),
            payload: ServicePayload {
                entity_id: entity_id.to_string(),
                extra: serde_json::Map::new(),
            },
        }
    }

    /// Add an extra payload field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Partial device record pushed to the client after a service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub id: String,
    pub domain: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub state: String,
}

impl StateUpdate {
    /// Build an update from a device; `None` when its id has no domain.
    #[must_use]
    pub fn from_device(device: Device) -> Option<Self> {
        let domain = device.domain()?.to_string();
        Some(Self {
            id: device.id,
            domain,
            attributes: device.attributes,
            state: device.state,
        })
    }

    /// The non-empty `friendly_name` carried by the update.
    #[must_use]
    pub fn friendly_name(&self) -> Option<&str> {
        device::friendly_name(&self.attributes)
    }

    /// View the update as a device, ready to be bound onto a card.
    #[must_use]
    pub fn to_device(&self) -> Device {
        Device {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            state: self.state.clone(),
        }
    }
}
