//! Read-only control tree rebuilt from the static descriptor alone, used when
//! no live root instance can be reached.

use log::{info, trace, warn};

use crate::control::{ControlNode, NodeBinding, PlaceholderPropertyControl};
use crate::descriptor::{BlueprintDescriptor, DocumentDescriptor};
use crate::kind::PropertyKind;

/// Placeholder for the first blueprint of `artboard`. `None` when the artboard
/// or its blueprints are missing, meaning there is nothing to display.
pub fn build_placeholder(descriptor: &DocumentDescriptor, artboard: &str) -> Option<ControlNode> {
    let Some(board) = descriptor.artboard(artboard) else {
        info!("placeholder: artboard `{artboard}` not in descriptor");
        return None;
    };
    let Some(blueprint) = board.first_view_model() else {
        info!("placeholder: artboard `{artboard}` declares no view models");
        return None;
    };
    Some(placeholder_node(blueprint))
}

/// Placeholder node for `blueprint` and its nested blueprints. A blueprint
/// nested inside itself is emitted once more with `truncated` set.
pub fn placeholder_node(blueprint: &BlueprintDescriptor) -> ControlNode {
    let mut chain = Vec::new();
    build(blueprint, &mut chain)
}

fn build<'a>(blueprint: &'a BlueprintDescriptor, chain: &mut Vec<&'a str>) -> ControlNode {
    let properties = blueprint
        .properties
        .iter()
        .filter(|p| {
            let keep = p.kind != PropertyKind::ViewModel;
            if !keep {
                trace!("placeholder: `{}` is represented as a nested node", p.name);
            }
            keep
        })
        .map(|p| PlaceholderPropertyControl {
            name: p.name.clone(),
            kind: p.kind.clone(),
            value: p.value.as_ref().and_then(|raw| raw.to_value(&p.kind)),
            enum_type_name: (p.kind == PropertyKind::Enum).then(|| {
                p.enum_type_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| p.name.clone())
            }),
        })
        .collect();

    let mut node = ControlNode {
        instance_name: blueprint.display_name().to_string(),
        blueprint_name: blueprint.blueprint_name.clone(),
        binding: NodeBinding::Placeholder { properties },
        nested_view_models: Vec::new(),
        truncated: false,
    };

    if chain.contains(&blueprint.blueprint_name.as_str()) {
        warn!(
            "placeholder: blueprint `{}` nests itself; not expanding further",
            blueprint.blueprint_name
        );
        node.truncated = true;
        return node;
    }

    chain.push(&blueprint.blueprint_name);
    node.nested_view_models = blueprint
        .nested_view_models
        .iter()
        .map(|nested| build(nested, chain))
        .collect();
    chain.pop();
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn static_values_follow_declared_kinds() {
        let doc = DocumentDescriptor::from_json(
            r##"{ "artboards": { "Main": { "viewModels": [{
                "blueprintName": "MainVM",
                "instanceName": "Default",
                "properties": [
                    { "name": "Active", "type": "boolean", "value": true },
                    { "name": "tint", "type": "color", "value": "#102030" },
                    { "name": "mood", "type": "enum", "value": "calm" },
                    { "name": "child", "type": "viewModel" }
                ],
                "nestedViewModels": [{ "blueprintName": "Sub" }]
            }]}}}"##,
        )
        .unwrap();

        let node = build_placeholder(&doc, "Main").expect("placeholder");
        assert!(node.is_placeholder());
        assert!(node.live_instance().is_none());
        assert_eq!(node.instance_name, "Default");
        assert_eq!(node.property_count(), 3);
        assert_eq!(
            node.placeholder_property("Active").unwrap().value,
            Some(Value::Bool(true))
        );
        assert_eq!(
            node.placeholder_property("tint").unwrap().value,
            Some(Value::Color(0xFF10_2030))
        );
        assert_eq!(
            node.placeholder_property("mood")
                .unwrap()
                .enum_type_name
                .as_deref(),
            Some("mood")
        );
        assert!(node.placeholder_property("child").is_none());
        assert_eq!(node.nested_view_models.len(), 1);
        assert_eq!(node.nested_view_models[0].instance_name, "Sub");
    }

    #[test]
    fn missing_artboard_or_blueprint_yields_none() {
        let doc = DocumentDescriptor::from_json(r#"{ "artboards": { "Empty": {} } }"#).unwrap();
        assert!(build_placeholder(&doc, "Empty").is_none());
        assert!(build_placeholder(&doc, "Missing").is_none());
    }

    #[test]
    fn self_nesting_blueprint_is_truncated() {
        let doc = DocumentDescriptor::from_json(
            r#"{ "artboards": { "Main": { "viewModels": [{
                "blueprintName": "Tree",
                "properties": [{ "name": "depth", "type": "number", "value": 0 }],
                "nestedViewModels": [{
                    "blueprintName": "Tree",
                    "instanceName": "child",
                    "properties": [{ "name": "depth", "type": "number", "value": 1 }],
                    "nestedViewModels": [{ "blueprintName": "Leaf" }]
                }]
            }]}}}"#,
        )
        .unwrap();

        let node = build_placeholder(&doc, "Main").unwrap();
        assert!(!node.truncated);
        let child = &node.nested_view_models[0];
        assert!(child.truncated);
        assert!(child.nested_view_models.is_empty());
        assert_eq!(
            child.placeholder_property("depth").unwrap().value,
            Some(Value::Number(1.0))
        );
    }
}
