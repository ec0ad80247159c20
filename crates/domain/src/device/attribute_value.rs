//! Typed attribute values attached to devices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single attribute value as reported by the hub.
///
/// Anything that is not a scalar (lists, objects, `null`) is kept verbatim
/// in [`Json`](Self::Json) so that a snapshot round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// Borrow the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Renders the value the way it is shown on a card (`21.5`, `40`, `on`).
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Int(i) => i.fmt(f),
            Self::Float(x) => x.fmt(f),
            Self::String(s) => f.write_str(s),
            Self::Json(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_string_variant_as_plain_string() {
        let val = AttributeValue::String("hello".to_string());
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "\"hello\"");
    }

    #[test]
    fn should_serialize_float_variant_as_number() {
        let val = AttributeValue::Float(21.5);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "21.5");
    }

    #[test]
    fn should_deserialize_integer_as_int_variant() {
        let val: AttributeValue = serde_json::from_str("40").unwrap();
        assert_eq!(val, AttributeValue::Int(40));
    }

    #[test]
    fn should_keep_lists_and_null_as_json_variant() {
        let list: AttributeValue = serde_json::from_str(r#"["heat", "off"]"#).unwrap();
        let null: AttributeValue = serde_json::from_str("null").unwrap();
        assert!(matches!(list, AttributeValue::Json(_)));
        assert_eq!(null, AttributeValue::Json(serde_json::Value::Null));
    }

    #[test]
    fn should_display_whole_float_without_fraction() {
        assert_eq!(AttributeValue::Float(21.0).to_string(), "21");
        assert_eq!(AttributeValue::Float(21.5).to_string(), "21.5");
    }

    #[test]
    fn should_only_expose_strings_through_as_str() {
        assert_eq!(AttributeValue::from("Lamp").as_str(), Some("Lamp"));
        assert_eq!(AttributeValue::Int(1).as_str(), None);
    }
}
