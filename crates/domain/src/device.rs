//! Device — one hub entity as mirrored between companion and client.
//!
//! The domain of a device (`light`, `switch`, `climate`, …) is never stored:
//! it is always sliced out of the id, so a rebound card can never disagree
//! with the device it shows.

mod attribute_value;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;

/// Attribute map of a device, keyed by attribute name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Attribute holding the human readable name of a device.
pub const FRIENDLY_NAME: &str = "friendly_name";

/// Domain the hub uses to aggregate other entities; never mirrored live.
pub const GROUP_DOMAIN: &str = "group";

/// Return the domain prefix of an entity id (`"light"` for `"light.lamp"`).
///
/// Ids without a `.` have no resolvable domain.
#[must_use]
pub fn domain_of(id: &str) -> Option<&str> {
    id.split_once('.').map(|(domain, _)| domain)
}

/// A device as it travels inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Entity id in `<domain>.<object_id>` form.
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub state: String,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Domain derived from the id.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        domain_of(&self.id)
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// The `friendly_name` attribute, when it is a non-empty string.
    #[must_use]
    pub fn friendly_name(&self) -> Option<&str> {
        friendly_name(&self.attributes)
    }
}

/// Shared by devices and live updates: a name only counts when non-empty.
#[must_use]
pub fn friendly_name(attributes: &Attributes) -> Option<&str> {
    attributes
        .get(FRIENDLY_NAME)
        .and_then(AttributeValue::as_str)
        .filter(|name| !name.is_empty())
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: String,
    attributes: Attributes,
    state: String,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn friendly_name(self, name: &str) -> Self {
        self.attribute(FRIENDLY_NAME, name)
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    #[must_use]
    pub fn build(self) -> Device {
        Device {
            id: self.id,
            attributes: self.attributes,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> Device {
        Device::builder()
            .id("light.lamp")
            .friendly_name("Lamp")
            .state("off")
            .build()
    }

    #[test]
    fn should_derive_domain_from_id() {
        assert_eq!(lamp().domain(), Some("light"));
    }

    #[test]
    fn should_slice_domain_before_first_dot_only() {
        assert_eq!(domain_of("sensor.kitchen.temp"), Some("sensor"));
    }

    #[test]
    fn should_have_no_domain_when_id_has_no_dot() {
        assert_eq!(domain_of("orphan"), None);
    }

    #[test]
    fn should_expose_friendly_name() {
        assert_eq!(lamp().friendly_name(), Some("Lamp"));
    }

    #[test]
    fn should_ignore_empty_friendly_name() {
        let device = Device::builder().id("light.x").friendly_name("").build();
        assert_eq!(device.friendly_name(), None);
    }

    #[test]
    fn should_ignore_non_string_friendly_name() {
        let device = Device::builder()
            .id("light.x")
            .attribute(FRIENDLY_NAME, 3_i64)
            .build();
        assert_eq!(device.friendly_name(), None);
    }

    #[test]
    fn should_deserialize_without_attributes() {
        let device: Device = serde_json::from_str(r#"{"id":"switch.fan","state":"on"}"#).unwrap();
        assert!(device.attributes.is_empty());
        assert_eq!(device.state, "on");
    }
}
