//! Static document descriptor produced by the design-time parser.
//!
//! JSON shape (camelCase):
//!
//! ```json
//! {
//!   "artboards": {
//!     "Main": {
//!       "stateMachines": [{
//!         "name": "State Machine 1",
//!         "inputs": [{ "name": "hover", "type": "boolean" }]
//!       }],
//!       "viewModels": [{
//!         "blueprintName": "MainVM",
//!         "instanceName": "Default",
//!         "properties": [
//!           { "name": "mood", "type": "enum", "enumTypeName": "Mood", "value": "calm" }
//!         ],
//!         "nestedViewModels": [{ "blueprintName": "Sub", "properties": [] }]
//!       }]
//!     }
//!   },
//!   "viewModelDefinitions": [],
//!   "enums": { "Mood": ["calm", "angry"] }
//! }
//! ```
//!
//! Artboard order is preserved. The descriptor is never mutated by the
//! connector.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::kind::{InputKind, PropertyKind};
use crate::value::RawValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    #[serde(default)]
    pub artboards: IndexMap<String, ArtboardDescriptor>,
    /// Document-wide blueprint catalog keyed by `blueprintName`.
    #[serde(default)]
    pub view_model_definitions: Vec<BlueprintDescriptor>,
    /// Enum type name -> ordered value names.
    #[serde(default)]
    pub enums: IndexMap<String, Vec<String>>,
}

impl DocumentDescriptor {
    pub fn from_json(s: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn artboard(&self, name: &str) -> Option<&ArtboardDescriptor> {
        self.artboards.get(name)
    }

    pub fn first_artboard_name(&self) -> Option<&str> {
        self.artboards.keys().next().map(String::as_str)
    }

    pub fn state_machine(&self, artboard: &str, name: &str) -> Option<&StateMachineDescriptor> {
        self.artboard(artboard)?
            .state_machines
            .iter()
            .find(|sm| sm.name == name)
    }

    /// Blueprints in lookup priority order: the definitions catalog first, then
    /// every artboard's blueprints depth-first.
    pub fn blueprints(&self) -> Vec<&BlueprintDescriptor> {
        let mut out = Vec::new();
        for bp in &self.view_model_definitions {
            bp.collect_into(&mut out);
        }
        for artboard in self.artboards.values() {
            for bp in &artboard.view_models {
                bp.collect_into(&mut out);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtboardDescriptor {
    #[serde(default)]
    pub state_machines: Vec<StateMachineDescriptor>,
    #[serde(default)]
    pub view_models: Vec<BlueprintDescriptor>,
}

impl ArtboardDescriptor {
    pub fn first_view_model(&self) -> Option<&BlueprintDescriptor> {
        self.view_models.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineDescriptor {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<InputDescriptor>,
}

impl StateMachineDescriptor {
    pub fn input(&self, name: &str) -> Option<&InputDescriptor> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
}

/// A view-model blueprint together with the instance the parser found for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintDescriptor {
    pub blueprint_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub nested_view_models: Vec<BlueprintDescriptor>,
}

impl BlueprintDescriptor {
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Instance name when recorded, otherwise the blueprint name.
    pub fn display_name(&self) -> &str {
        match self.instance_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.blueprint_name,
        }
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a BlueprintDescriptor>) {
        out.push(self);
        for nested in &self.nested_view_models {
            nested.collect_into(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type_name: Option<String>,
    /// Blueprint referenced by a `viewModel` property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
}
