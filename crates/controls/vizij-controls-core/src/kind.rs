//! Declared types of view-model properties and state-machine inputs.
//!
//! Both runtimes and descriptors report types as loose strings. They are parsed
//! into closed enums here; anything unrecognised lands in `Other` and is carried
//! through untouched so callers can skip it without failing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Type of a view-model property.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Boolean,
    Number,
    String,
    Color,
    Enum,
    Trigger,
    ViewModel,
    /// Any type the connector does not bind (lists, images, artboards, ...).
    Other(String),
}

impl PropertyKind {
    /// Parse a runtime or descriptor type name. Matching is case-insensitive and
    /// accepts the runtime spellings (`enumType`, `bool`).
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        let is = |name: &str| t.eq_ignore_ascii_case(name);
        if is("boolean") || is("bool") {
            PropertyKind::Boolean
        } else if is("number") {
            PropertyKind::Number
        } else if is("string") {
            PropertyKind::String
        } else if is("color") {
            PropertyKind::Color
        } else if is("enum") || is("enumType") {
            PropertyKind::Enum
        } else if is("trigger") {
            PropertyKind::Trigger
        } else if is("viewModel") {
            PropertyKind::ViewModel
        } else {
            PropertyKind::Other(t.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyKind::Boolean => "boolean",
            PropertyKind::Number => "number",
            PropertyKind::String => "string",
            PropertyKind::Color => "color",
            PropertyKind::Enum => "enum",
            PropertyKind::Trigger => "trigger",
            PropertyKind::ViewModel => "viewModel",
            PropertyKind::Other(s) => s,
        }
    }

    /// Boolean, number and string: the kinds the binding probe can exercise.
    pub fn is_probeable(&self) -> bool {
        matches!(
            self,
            PropertyKind::Boolean | PropertyKind::Number | PropertyKind::String
        )
    }

    /// Kinds that map onto a property accessor (everything except nested view
    /// models and unknown types).
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, PropertyKind::ViewModel | PropertyKind::Other(_))
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PropertyKind::parse(s))
    }
}

impl Serialize for PropertyKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyKind {
    fn deserialize<D>(deserializer: D) -> Result<PropertyKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PropertyKind::parse(&s))
    }
}

/// Type of a state-machine input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    Boolean,
    Number,
    Trigger,
    Other(String),
}

impl InputKind {
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.eq_ignore_ascii_case("boolean") || t.eq_ignore_ascii_case("bool") {
            InputKind::Boolean
        } else if t.eq_ignore_ascii_case("number") {
            InputKind::Number
        } else if t.eq_ignore_ascii_case("trigger") {
            InputKind::Trigger
        } else {
            InputKind::Other(t.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputKind::Boolean => "boolean",
            InputKind::Number => "number",
            InputKind::Trigger => "trigger",
            InputKind::Other(s) => s,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(InputKind::parse(s))
    }
}

impl Serialize for InputKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InputKind {
    fn deserialize<D>(deserializer: D) -> Result<InputKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(InputKind::parse(&s))
    }
}
