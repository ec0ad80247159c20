//! Card renderers — how a device of a given domain is drawn and controlled.

use std::cmp::Ordering;

use homebutler_domain::device::Device;
use homebutler_domain::envelope::ServiceCall;

use super::ids::{BACKGROUND, HUMIDITY, TEMPERATURE};
use crate::ports::document::{Animation, Document, child};

pub const HEAT_COOL_COLOR: &str = "#61C2F2";
pub const COOL_COLOR: &str = "#6CD99A";
pub const HEAT_COLOR: &str = "#FF5967";

/// What a tap on a card asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickIntent {
    /// The card looks disabled: switch the device on.
    Activate,
    /// The card looks enabled: switch the device off.
    Deactivate,
}

impl ClickIntent {
    /// Infer the intent from the rendered opacity of the card's `state`
    /// indicator: visible means the card is disabled, fully transparent
    /// means it is enabled.
    ///
    /// Any other reading (negative, NaN, missing element) yields `None` and
    /// the click is dropped. Intermediate values can show up while a
    /// transition is running.
    #[must_use]
    pub fn from_indicator_opacity(opacity: Option<f64>) -> Option<Self> {
        match opacity?.partial_cmp(&0.0)? {
            Ordering::Greater => Some(Self::Activate),
            Ordering::Equal => Some(Self::Deactivate),
            Ordering::Less => None,
        }
    }
}

/// Domain-specific part of card binding and click handling.
///
/// The engine has already revealed the card and written its name when
/// [`bind`](Self::bind) runs.
pub trait CardRenderer: Send + Sync {
    /// Draw the device state onto the card.
    fn bind(&self, document: &mut dyn Document, card: &str, device: &Device);

    /// Service call matching a click on a card bound to `entity_id`.
    fn command(&self, domain: &str, entity_id: &str, intent: ClickIntent) -> ServiceCall;
}

fn bind_on_off(document: &mut dyn Document, card: &str, device: &Device) {
    match device.state.as_str() {
        "on" => document.animate(card, Animation::Enable),
        "off" => document.animate(card, Animation::Disable),
        _ => {}
    }
}

fn turn_on_off(domain: &str, entity_id: &str, intent: ClickIntent) -> ServiceCall {
    let service = match intent {
        ClickIntent::Activate => "turn_on",
        ClickIntent::Deactivate => "turn_off",
    };
    ServiceCall::new(domain, service, entity_id)
}

/// Lights and switches: `on`/`off`, toggled with `turn_on`/`turn_off`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightSwitchCard;

impl CardRenderer for LightSwitchCard {
    fn bind(&self, document: &mut dyn Document, card: &str, device: &Device) {
        bind_on_off(document, card, device);
    }

    fn command(&self, domain: &str, entity_id: &str, intent: ClickIntent) -> ServiceCall {
        turn_on_off(domain, entity_id, intent)
    }
}

/// Any domain without a dedicated renderer; behaves like a switch.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCard;

impl CardRenderer for DefaultCard {
    fn bind(&self, document: &mut dyn Document, card: &str, device: &Device) {
        bind_on_off(document, card, device);
    }

    fn command(&self, domain: &str, entity_id: &str, intent: ClickIntent) -> ServiceCall {
        turn_on_off(domain, entity_id, intent)
    }
}

/// Thermostats: readings, a mode color and `set_hvac_mode` on click.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClimateCard;

impl ClimateCard {
    fn reading(device: &Device, key: &str) -> String {
        device
            .get_attribute(key)
            .map_or_else(|| "--".to_string(), ToString::to_string)
    }
}

impl CardRenderer for ClimateCard {
    fn bind(&self, document: &mut dyn Document, card: &str, device: &Device) {
        let temperature = Self::reading(device, "current_temperature");
        let humidity = Self::reading(device, "current_humidity");
        document.set_text(&child(card, TEMPERATURE), &format!("{temperature}\u{b0}"));
        document.set_text(&child(card, HUMIDITY), &format!("{humidity}%"));

        let color = match device.state.as_str() {
            "heat_cool" => HEAT_COOL_COLOR,
            "cool" => COOL_COLOR,
            "heat" => HEAT_COLOR,
            "off" => {
                document.animate(card, Animation::Disable);
                return;
            }
            _ => return,
        };
        document.set_fill(&child(card, BACKGROUND), color);
        document.animate(card, Animation::Enable);
    }

    fn command(&self, domain: &str, entity_id: &str, intent: ClickIntent) -> ServiceCall {
        let mode = match intent {
            ClickIntent::Activate => "heat_cool",
            ClickIntent::Deactivate => "off",
        };
        ServiceCall::new(domain, "set_hvac_mode", entity_id).with("hvac_mode", mode)
    }
}
