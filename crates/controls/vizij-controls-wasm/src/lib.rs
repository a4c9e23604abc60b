use js_sys::{Reflect, JSON};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_controls::{
    verify_binding, ActiveSelection, Connector, ConnectorConfig, ControlTree, DocumentDescriptor,
    RuntimeHandle,
};

mod export;
mod js_runtime;

pub use js_runtime::{JsDefinition, JsInput, JsInstance, JsProperty, JsRuntime};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_descriptor(descriptor: &JsValue) -> Result<Option<DocumentDescriptor>, JsError> {
    if jsvalue_is_undefined_or_null(descriptor) {
        return Ok(None);
    }
    // Accept either a JSON string or a parsed object; reuse the core parser.
    let text = match descriptor.as_string() {
        Some(s) => s,
        None => JSON::stringify(descriptor)
            .map_err(|e| JsError::new(&format!("descriptor stringify error: {:?}", e)))?
            .as_string()
            .ok_or_else(|| JsError::new("descriptor: stringify produced non-string"))?,
    };
    DocumentDescriptor::from_json(&text)
        .map(Some)
        .map_err(|e| JsError::new(&format!("descriptor parse error: {e}")))
}

fn parse_or_default<T: serde::de::DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsError> {
    if jsvalue_is_undefined_or_null(&value) {
        Ok(T::default())
    } else {
        swb::from_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
    }
}

/// Connector bound to one configuration. Reuse it across rebuilds.
#[wasm_bindgen]
pub struct VizijControls {
    connector: Connector,
}

#[wasm_bindgen]
impl VizijControls {
    /// Create a connector. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new VizijControls({ verify_bindings: false })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijControls, JsError> {
        console_error_panic_hook::set_once();
        let cfg: ConnectorConfig = parse_or_default(config, "config")?;
        Ok(VizijControls {
            connector: Connector::new(cfg),
        })
    }

    /// Build the control tree. `descriptor` is the design-time JSON (string or
    /// object), `rive` the live runtime object; either may be null.
    /// `selection` is `{ artboard?, stateMachines? }`.
    #[wasm_bindgen]
    pub fn build(
        &self,
        descriptor: JsValue,
        rive: JsValue,
        selection: JsValue,
    ) -> Result<JsValue, JsError> {
        let tree = self.tree(&descriptor, rive, selection)?;
        Ok(export::tree_to_js(&tree))
    }

    /// Value-only snapshot of the control tree, read through the live handles.
    #[wasm_bindgen]
    pub fn snapshot(
        &self,
        descriptor: JsValue,
        rive: JsValue,
        selection: JsValue,
    ) -> Result<JsValue, JsError> {
        let tree = self.tree(&descriptor, rive, selection)?;
        swb::to_value(&tree.snapshot()).map_err(|e| JsError::new(&format!("snapshot error: {e}")))
    }

    /// Probe one scalar property of a view-model instance object and restore it.
    #[wasm_bindgen(js_name = verify_instance_binding)]
    pub fn verify_instance_binding(&self, instance: JsValue) -> bool {
        let config = self.connector.config();
        verify_binding(
            &JsInstance::new(instance),
            config.probe_property.as_deref(),
            config,
        )
    }

    /// Effective configuration, defaults filled in.
    #[wasm_bindgen]
    pub fn config(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.connector.config())
            .map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

impl VizijControls {
    fn tree(
        &self,
        descriptor: &JsValue,
        rive: JsValue,
        selection: JsValue,
    ) -> Result<ControlTree, JsError> {
        let descriptor = parse_descriptor(descriptor)?;
        let selection: ActiveSelection = parse_or_default(selection, "selection")?;
        let runtime = (!jsvalue_is_undefined_or_null(&rive)).then(|| JsRuntime::new(rive));
        Ok(self.connector.connect(
            descriptor.as_ref(),
            runtime.as_ref().map(|rt| rt as &dyn RuntimeHandle),
            &selection,
        ))
    }
}

/// One-shot build with an optional config.
#[wasm_bindgen(js_name = build_controls)]
pub fn build_controls(
    descriptor: JsValue,
    rive: JsValue,
    selection: JsValue,
    config: JsValue,
) -> Result<JsValue, JsError> {
    VizijControls::new(config)?.build(descriptor, rive, selection)
}

/// One-shot snapshot with an optional config.
#[wasm_bindgen(js_name = snapshot_controls)]
pub fn snapshot_controls(
    descriptor: JsValue,
    rive: JsValue,
    selection: JsValue,
    config: JsValue,
) -> Result<JsValue, JsError> {
    VizijControls::new(config)?.snapshot(descriptor, rive, selection)
}

/// Publish `tree` on `globalThis[key]` for inspection from devtools. Nothing is
/// exposed unless the host calls this.
#[wasm_bindgen(js_name = expose_for_debugging)]
pub fn expose_for_debugging(tree: JsValue, key: String) -> Result<(), JsError> {
    if key.is_empty() {
        return Err(JsError::new("expose_for_debugging: key must not be empty"));
    }
    Reflect::set(&js_sys::global(), &JsValue::from_str(&key), &tree)
        .map_err(|e| JsError::new(&format!("expose_for_debugging error: {:?}", e)))?;
    Ok(())
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
