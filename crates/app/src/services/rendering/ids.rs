//! Element ids and class names the UI markup must provide.

/// Selector list holding one entry per domain section.
pub const DOMAIN_LIST: &str = "domain-list";
pub const WARNING_TITLE: &str = "warning-title";
pub const WARNING_CONTENT: &str = "warning-content";

/// Card children.
pub const NAME: &str = "name";
/// Indicator whose opacity reflects the enabled/disabled look of a card.
pub const STATE: &str = "state";
pub const BACKGROUND: &str = "background";
pub const TEMPERATURE: &str = "temperature";
pub const HUMIDITY: &str = "humidity";

/// Every child a card may carry.
pub const CARD_CHILDREN: [&str; 5] = [NAME, STATE, BACKGROUND, TEMPERATURE, HUMIDITY];

/// Section revealed when the domain has devices.
#[must_use]
pub fn section(domain: &str) -> String {
    format!("{domain}-domain")
}

/// List of the domain's cards.
#[must_use]
pub fn list(domain: &str) -> String {
    format!("{domain}-list")
}

/// Card slot `index` of a domain. Cards also carry the domain as class.
#[must_use]
pub fn card(domain: &str, index: usize) -> String {
    format!("{domain}-{index}")
}
