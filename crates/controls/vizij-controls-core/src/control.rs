//! Control tree: the connector's output.
//!
//! Live nodes hand out the runtime's own handles so the UI writes straight
//! into the running document. Placeholder nodes carry static descriptor values
//! only. The [`NodeBinding`] enum keeps the two from mixing within a node.

use serde::Serialize;

use crate::descriptor::InputDescriptor;
use crate::kind::{InputKind, PropertyKind};
use crate::runtime::{InputRef, InstanceRef, LivePropertyRef};
use crate::value::Value;

/// Property entry of a live node.
#[derive(Clone, Debug)]
pub struct LivePropertyControl {
    pub name: String,
    pub kind: PropertyKind,
    /// The exact handle the runtime returned.
    pub live_property: LivePropertyRef,
    /// Present on every enum property.
    pub enum_type_name: Option<String>,
}

/// Property entry of a placeholder node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderPropertyControl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_type_name: Option<String>,
}

#[derive(Clone, Debug)]
pub enum NodeBinding {
    Live {
        instance: InstanceRef,
        properties: Vec<LivePropertyControl>,
    },
    Placeholder {
        properties: Vec<PlaceholderPropertyControl>,
    },
}

#[derive(Clone, Debug)]
pub struct ControlNode {
    pub instance_name: String,
    pub blueprint_name: String,
    pub binding: NodeBinding,
    pub nested_view_models: Vec<ControlNode>,
    /// Set when nested expansion stopped here (revisited blueprint or instance,
    /// or depth limit).
    pub truncated: bool,
}

impl ControlNode {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.binding, NodeBinding::Placeholder { .. })
    }

    pub fn live_instance(&self) -> Option<&InstanceRef> {
        match &self.binding {
            NodeBinding::Live { instance, .. } => Some(instance),
            NodeBinding::Placeholder { .. } => None,
        }
    }

    /// Live property entries; empty for placeholder nodes.
    pub fn live_properties(&self) -> &[LivePropertyControl] {
        match &self.binding {
            NodeBinding::Live { properties, .. } => properties,
            NodeBinding::Placeholder { .. } => &[],
        }
    }

    /// Placeholder property entries; empty for live nodes.
    pub fn placeholder_properties(&self) -> &[PlaceholderPropertyControl] {
        match &self.binding {
            NodeBinding::Placeholder { properties } => properties,
            NodeBinding::Live { .. } => &[],
        }
    }

    pub fn property_count(&self) -> usize {
        match &self.binding {
            NodeBinding::Live { properties, .. } => properties.len(),
            NodeBinding::Placeholder { properties } => properties.len(),
        }
    }

    pub fn live_property(&self, name: &str) -> Option<&LivePropertyControl> {
        self.live_properties().iter().find(|p| p.name == name)
    }

    pub fn placeholder_property(&self, name: &str) -> Option<&PlaceholderPropertyControl> {
        self.placeholder_properties().iter().find(|p| p.name == name)
    }

    pub fn nested(&self, instance_name: &str) -> Option<&ControlNode> {
        self.nested_view_models
            .iter()
            .find(|n| n.instance_name == instance_name)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .nested_view_models
            .iter()
            .map(ControlNode::node_count)
            .sum::<usize>()
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        let properties = match &self.binding {
            NodeBinding::Live { properties, .. } => properties
                .iter()
                .map(|p| PropertySnapshot {
                    name: p.name.clone(),
                    kind: p.kind.clone(),
                    value: p.live_property.value().ok(),
                    enum_type_name: p.enum_type_name.clone(),
                })
                .collect(),
            NodeBinding::Placeholder { properties } => properties
                .iter()
                .map(|p| PropertySnapshot {
                    name: p.name.clone(),
                    kind: p.kind.clone(),
                    value: p.value.clone(),
                    enum_type_name: p.enum_type_name.clone(),
                })
                .collect(),
        };
        NodeSnapshot {
            instance_name: self.instance_name.clone(),
            blueprint_name: self.blueprint_name.clone(),
            is_placeholder: self.is_placeholder(),
            truncated: self.truncated,
            properties,
            nested_view_models: self
                .nested_view_models
                .iter()
                .map(ControlNode::snapshot)
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputControl {
    pub name: String,
    pub kind: InputKind,
    pub live_input: InputRef,
    /// Descriptor entry with the same name, when there is one.
    pub parsed_info: Option<InputDescriptor>,
}

#[derive(Clone, Debug)]
pub struct StateMachineControl {
    pub name: String,
    pub is_active: bool,
    pub inputs: Vec<InputControl>,
}

impl StateMachineControl {
    pub fn input(&self, name: &str) -> Option<&InputControl> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ControlTree {
    pub active_artboard_name: Option<String>,
    pub active_state_machine_names: Vec<String>,
    pub active_view_model_name: Option<String>,
    pub state_machine_controls: Vec<StateMachineControl>,
    pub view_model_controls: Vec<ControlNode>,
}

impl ControlTree {
    pub fn is_empty(&self) -> bool {
        self.state_machine_controls.is_empty() && self.view_model_controls.is_empty()
    }

    pub fn root(&self) -> Option<&ControlNode> {
        self.view_model_controls.first()
    }

    pub fn state_machine(&self, name: &str) -> Option<&StateMachineControl> {
        self.state_machine_controls.iter().find(|sm| sm.name == name)
    }

    /// Value-only projection, reading current values through the live handles.
    pub fn snapshot(&self) -> ControlTreeSnapshot {
        ControlTreeSnapshot {
            active_artboard_name: self.active_artboard_name.clone(),
            active_state_machine_names: self.active_state_machine_names.clone(),
            active_view_model_name: self.active_view_model_name.clone(),
            state_machines: self
                .state_machine_controls
                .iter()
                .map(|sm| StateMachineSnapshot {
                    name: sm.name.clone(),
                    is_active: sm.is_active,
                    inputs: sm
                        .inputs
                        .iter()
                        .map(|i| InputSnapshot {
                            name: i.name.clone(),
                            kind: i.kind.clone(),
                            value: i.live_input.value().ok(),
                        })
                        .collect(),
                })
                .collect(),
            view_models: self
                .view_model_controls
                .iter()
                .map(ControlNode::snapshot)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlTreeSnapshot {
    pub active_artboard_name: Option<String>,
    pub active_state_machine_names: Vec<String>,
    pub active_view_model_name: Option<String>,
    pub state_machines: Vec<StateMachineSnapshot>,
    pub view_models: Vec<NodeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineSnapshot {
    pub name: String,
    pub is_active: bool,
    pub inputs: Vec<InputSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub value: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub instance_name: String,
    pub blueprint_name: String,
    pub is_placeholder: bool,
    pub truncated: bool,
    pub properties: Vec<PropertySnapshot>,
    pub nested_view_models: Vec<NodeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_type_name: Option<String>,
}
