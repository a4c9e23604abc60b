//! Control tree -> plain JS object tree.
//!
//! `liveInstance`, `liveProperty` and `liveInput` are the runtime's own JS
//! objects, so UI code writes straight into the running document.

use js_sys::{Array, Object, Reflect};
use log::warn;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;

use vizij_controls::{
    ControlNode, ControlTree, InputControl, LivePropertyControl, NodeBinding,
    PlaceholderPropertyControl, StateMachineControl,
};

use crate::js_runtime::{JsInput, JsInstance, JsProperty};

fn set(target: &Object, key: &str, value: &JsValue) {
    // Plain objects accept every own-property write.
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

fn opt_str(value: Option<&str>) -> JsValue {
    value.map_or(JsValue::UNDEFINED, JsValue::from_str)
}

fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> JsValue {
    swb::to_value(value).unwrap_or_else(|err| {
        warn!("export: {what} could not be converted ({err}); leaving it undefined");
        JsValue::UNDEFINED
    })
}

fn array<I: IntoIterator<Item = JsValue>>(items: I) -> Array {
    items.into_iter().collect()
}

pub fn tree_to_js(tree: &ControlTree) -> JsValue {
    let out = Object::new();
    set(
        &out,
        "activeArtboardName",
        &opt_str(tree.active_artboard_name.as_deref()),
    );
    set(
        &out,
        "activeStateMachineNames",
        &array(
            tree.active_state_machine_names
                .iter()
                .map(|n| JsValue::from_str(n)),
        ),
    );
    set(
        &out,
        "activeViewModelName",
        &opt_str(tree.active_view_model_name.as_deref()),
    );
    set(
        &out,
        "stateMachineControls",
        &array(tree.state_machine_controls.iter().map(state_machine_to_js)),
    );
    set(
        &out,
        "viewModelControls",
        &array(tree.view_model_controls.iter().map(node_to_js)),
    );
    out.into()
}

fn state_machine_to_js(sm: &StateMachineControl) -> JsValue {
    let out = Object::new();
    set(&out, "name", &JsValue::from_str(&sm.name));
    set(&out, "isActive", &JsValue::from_bool(sm.is_active));
    set(&out, "inputs", &array(sm.inputs.iter().map(input_to_js)));
    out.into()
}

fn input_to_js(input: &InputControl) -> JsValue {
    let out = Object::new();
    set(&out, "name", &JsValue::from_str(&input.name));
    set(&out, "type", &JsValue::from_str(input.kind.as_str()));
    let live = input
        .live_input
        .as_any()
        .downcast_ref::<JsInput>()
        .map_or(JsValue::UNDEFINED, |js| js.object().clone());
    set(&out, "liveInput", &live);
    if let Some(parsed) = &input.parsed_info {
        set(&out, "parsedInfo", &to_js(parsed, "parsedInfo"));
    }
    out.into()
}

pub fn node_to_js(node: &ControlNode) -> JsValue {
    let out = Object::new();
    set(&out, "instanceName", &JsValue::from_str(&node.instance_name));
    set(&out, "blueprintName", &JsValue::from_str(&node.blueprint_name));
    set(&out, "isPlaceholder", &JsValue::from_bool(node.is_placeholder()));
    set(&out, "truncated", &JsValue::from_bool(node.truncated));
    let properties = match &node.binding {
        NodeBinding::Live {
            instance,
            properties,
        } => {
            if let Some(js) = instance.as_any().downcast_ref::<JsInstance>() {
                set(&out, "liveInstance", js.object());
            }
            array(properties.iter().map(live_property_to_js))
        }
        NodeBinding::Placeholder { properties } => {
            array(properties.iter().map(placeholder_property_to_js))
        }
    };
    set(&out, "properties", &properties);
    set(
        &out,
        "nestedViewModels",
        &array(node.nested_view_models.iter().map(node_to_js)),
    );
    out.into()
}

fn live_property_to_js(p: &LivePropertyControl) -> JsValue {
    let out = Object::new();
    set(&out, "name", &JsValue::from_str(&p.name));
    set(&out, "type", &JsValue::from_str(p.kind.as_str()));
    let live = p
        .live_property
        .as_any()
        .downcast_ref::<JsProperty>()
        .map_or(JsValue::UNDEFINED, |js| js.object().clone());
    set(&out, "liveProperty", &live);
    if let Some(enum_type) = &p.enum_type_name {
        set(&out, "enumTypeName", &JsValue::from_str(enum_type));
    }
    out.into()
}

fn placeholder_property_to_js(p: &PlaceholderPropertyControl) -> JsValue {
    let out = Object::new();
    set(&out, "name", &JsValue::from_str(&p.name));
    set(&out, "type", &JsValue::from_str(p.kind.as_str()));
    if let Some(value) = &p.value {
        set(&out, "value", &to_js(value, "value"));
    }
    if let Some(enum_type) = &p.enum_type_name {
        set(&out, "enumTypeName", &JsValue::from_str(enum_type));
    }
    out.into()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[wasm_bindgen_test]
    fn unconvertible_values_export_as_undefined() {
        assert!(to_js(&Unserializable, "value").is_undefined());
        assert_eq!(to_js(&3.5, "value").as_f64(), Some(3.5));
    }
}
