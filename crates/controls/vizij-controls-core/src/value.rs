//! Value: what a view-model property or state-machine input currently holds.
//! Numbers are f64 to match the runtime; colors are packed 0xAARRGGBB.

use serde::{Deserialize, Serialize};

use crate::kind::PropertyKind;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    Bool(bool),

    Number(f64),

    Text(String),

    /// Packed ARGB color.
    Color(u32),

    /// Name of the selected enum value.
    Enum(String),

    /// Triggers carry no state; writing this value fires the trigger.
    Trigger,
}

impl Value {
    /// The property kind this value naturally belongs to.
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Value::Bool(_) => PropertyKind::Boolean,
            Value::Number(_) => PropertyKind::Number,
            Value::Text(_) => PropertyKind::String,
            Value::Color(_) => PropertyKind::Color,
            Value::Enum(_) => PropertyKind::Enum,
            Value::Trigger => PropertyKind::Trigger,
        }
    }
}

/// Untyped static value as written by the design-time parser. The declared
/// property type decides how it is read (see [`RawValue::to_value`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Interpret the raw value as a property of `kind`. Returns `None` when
    /// the shapes disagree or the kind carries no static value.
    pub fn to_value(&self, kind: &PropertyKind) -> Option<Value> {
        match (kind, self) {
            (PropertyKind::Boolean, RawValue::Bool(b)) => Some(Value::Bool(*b)),
            (PropertyKind::Number, RawValue::Number(n)) => Some(Value::Number(*n)),
            (PropertyKind::String, RawValue::Text(s)) => Some(Value::Text(s.clone())),
            (PropertyKind::Enum, RawValue::Text(s)) => Some(Value::Enum(s.clone())),
            (PropertyKind::Color, RawValue::Number(n)) if *n >= 0.0 && *n <= u32::MAX as f64 => {
                Some(Value::Color(*n as u32))
            }
            (PropertyKind::Color, RawValue::Text(s)) => parse_hex_color(s).map(Value::Color),
            (PropertyKind::Trigger, _) => Some(Value::Trigger),
            _ => None,
        }
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB` into packed ARGB.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.trim().strip_prefix('#')?;
    let packed = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(0xFF00_0000 | packed),
        8 => Some(packed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_follow_declared_kind() {
        assert_eq!(
            RawValue::Text("Idle".into()).to_value(&PropertyKind::Enum),
            Some(Value::Enum("Idle".into()))
        );
        assert_eq!(
            RawValue::Text("#336699".into()).to_value(&PropertyKind::Color),
            Some(Value::Color(0xFF33_6699))
        );
        assert_eq!(RawValue::Bool(true).to_value(&PropertyKind::Number), None);
    }

    #[test]
    fn hex_colors_require_six_or_eight_digits() {
        assert_eq!(parse_hex_color("#80FF0000"), Some(0x80FF_0000));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("336699"), None);
    }

    #[test]
    fn tagged_json_shape() {
        let v = Value::Number(2.5);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"type": "number", "data": 2.5}));
    }
}
