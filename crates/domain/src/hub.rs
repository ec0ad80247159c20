//! Wire records of the home-automation hub's REST API.

use serde::{Deserialize, Serialize};

use crate::device::{Attributes, Device};

/// One element of `GET /states` (and of a service call's response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubState {
    pub entity_id: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub state: String,
}

impl HubState {
    /// Normalize into the shared [`Device`] model.
    #[must_use]
    pub fn into_device(self) -> Device {
        Device {
            id: self.entity_id,
            attributes: self.attributes,
            state: self.state,
        }
    }
}

impl From<Device> for HubState {
    fn from(device: Device) -> Self {
        Self {
            entity_id: device.id,
            attributes: device.attributes,
            state: device.state,
        }
    }
}

/// One element of `GET /services`: a domain and its callable services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubServiceDomain {
    pub domain: String,
    /// Service name to field schema; only the names are used.
    #[serde(default)]
    pub services: serde_json::Map<String, serde_json::Value>,
}

impl HubServiceDomain {
    /// Names of the services offered by this domain.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}
