//! Capability traits implemented over a JS runtime object.
//!
//! The object shape follows the Rive web runtime: `viewModelInstance`,
//! `defaultViewModel()`, `stateMachineInputs(name)`, instance accessors
//! `boolean/number/string/color/enum/trigger/viewModel` and property `.value`.
//! Missing methods surface as `Unsupported`, thrown exceptions as `Failed`,
//! and `null`/`undefined` results as `Ok(None)`.

use std::any::Any;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use vizij_controls::{
    Access, AccessError, DefinitionRef, InputKind, InputRef, InstanceRef, LiveProperty,
    LivePropertyRef, PropertyInfo, PropertyKind, RuntimeHandle, StateMachineInput, Value,
    ViewModelDefinition, ViewModelInstance,
};

const INPUT_TYPE_NUMBER: f64 = 56.0;
const INPUT_TYPE_TRIGGER: f64 = 58.0;
const INPUT_TYPE_BOOLEAN: f64 = 59.0;

fn is_nullish(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn describe(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn type_name(v: &JsValue) -> String {
    v.js_typeof().as_string().unwrap_or_default()
}

fn get(target: &JsValue, key: &str, capability: &'static str) -> Result<JsValue, AccessError> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|e| AccessError::failed(capability, key, describe(&e)))
}

fn get_string(target: &JsValue, key: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty())
}

/// Call `target[method](arg)`.
fn call(
    target: &JsValue,
    method: &'static str,
    name: &str,
    arg: Option<&JsValue>,
) -> Access<JsValue> {
    let func = get(target, method, method)?;
    let Some(func) = func.dyn_ref::<Function>() else {
        return Err(AccessError::unsupported(method));
    };
    let result = match arg {
        Some(arg) => func.call1(target, arg),
        None => func.call0(target),
    }
    .map_err(|e| AccessError::failed(method, name, describe(&e)))?;
    Ok((!is_nullish(&result)).then_some(result))
}

fn instance_ref(object: JsValue) -> InstanceRef {
    Rc::new(JsInstance::new(object))
}

fn property_value(kind: &PropertyKind, raw: &JsValue) -> Result<Value, AccessError> {
    let mismatch = |expected: &'static str| AccessError::TypeMismatch {
        expected,
        found: type_name(raw),
    };
    match kind {
        PropertyKind::Boolean => raw.as_bool().map(Value::Bool).ok_or_else(|| mismatch("boolean")),
        PropertyKind::Number => raw.as_f64().map(Value::Number).ok_or_else(|| mismatch("number")),
        PropertyKind::String => raw.as_string().map(Value::Text).ok_or_else(|| mismatch("string")),
        PropertyKind::Enum => raw.as_string().map(Value::Enum).ok_or_else(|| mismatch("enum")),
        // Colors arrive as signed 32-bit ARGB integers.
        PropertyKind::Color => raw
            .as_f64()
            .map(|n| Value::Color(n as i64 as u32))
            .ok_or_else(|| mismatch("color")),
        PropertyKind::Trigger => Ok(Value::Trigger),
        PropertyKind::ViewModel | PropertyKind::Other(_) => Err(mismatch("scalar")),
    }
}

fn to_js(value: &Value) -> JsValue {
    match value {
        Value::Bool(b) => JsValue::from_bool(*b),
        Value::Number(n) => JsValue::from_f64(*n),
        Value::Text(s) | Value::Enum(s) => JsValue::from_str(s),
        Value::Color(argb) => JsValue::from(*argb as i32),
        Value::Trigger => JsValue::UNDEFINED,
    }
}

fn write_value(target: &JsValue, name: &str, value: &Value) -> Result<(), AccessError> {
    match Reflect::set(target, &JsValue::from_str("value"), &to_js(value)) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AccessError::failed("setValue", name, "value is read-only")),
        Err(e) => Err(AccessError::failed("setValue", name, describe(&e))),
    }
}

/// A view-model property object.
#[derive(Debug)]
pub struct JsProperty {
    object: JsValue,
    name: String,
    kind: PropertyKind,
}

impl JsProperty {
    /// The JS object the runtime returned.
    pub fn object(&self) -> &JsValue {
        &self.object
    }
}

impl LiveProperty for JsProperty {
    fn value(&self) -> Result<Value, AccessError> {
        if self.kind == PropertyKind::Trigger {
            return Ok(Value::Trigger);
        }
        let raw = get(&self.object, "value", "value")?;
        property_value(&self.kind, &raw)
    }

    fn set_value(&self, value: Value) -> Result<(), AccessError> {
        if self.kind == PropertyKind::Trigger {
            return self.fire();
        }
        write_value(&self.object, &self.name, &value)
    }

    fn fire(&self) -> Result<(), AccessError> {
        call(&self.object, "trigger", &self.name, None).map(|_| ())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A view-model instance object.
#[derive(Debug, Clone)]
pub struct JsInstance {
    object: JsValue,
}

impl JsInstance {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }

    pub fn object(&self) -> &JsValue {
        &self.object
    }

    fn accessor(
        &self,
        method: &'static str,
        name: &str,
        kind: PropertyKind,
    ) -> Access<LivePropertyRef> {
        let found = call(&self.object, method, name, Some(&JsValue::from_str(name)))?;
        Ok(found.map(|object| {
            Rc::new(JsProperty {
                object,
                name: name.to_string(),
                kind,
            }) as LivePropertyRef
        }))
    }
}

impl ViewModelInstance for JsInstance {
    fn name(&self) -> Option<String> {
        get_string(&self.object, "name")
    }

    fn properties(&self) -> Result<Vec<PropertyInfo>, AccessError> {
        let raw = get(&self.object, "properties", "properties")?;
        if is_nullish(&raw) {
            return Ok(Vec::new());
        }
        let list = raw
            .dyn_into::<Array>()
            .map_err(|other| AccessError::TypeMismatch {
                expected: "array",
                found: type_name(&other),
            })?;
        Ok(list
            .iter()
            .filter_map(|entry| {
                let name = get_string(&entry, "name")?;
                let kind = get_string(&entry, "type")
                    .map(|t| PropertyKind::parse(&t))
                    .unwrap_or_else(|| PropertyKind::Other(String::new()));
                Some(PropertyInfo::new(name, kind))
            })
            .collect())
    }

    fn boolean(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("boolean", name, PropertyKind::Boolean)
    }

    fn number(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("number", name, PropertyKind::Number)
    }

    fn string(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("string", name, PropertyKind::String)
    }

    fn color(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("color", name, PropertyKind::Color)
    }

    fn enumeration(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("enum", name, PropertyKind::Enum)
    }

    fn trigger(&self, name: &str) -> Access<LivePropertyRef> {
        self.accessor("trigger", name, PropertyKind::Trigger)
    }

    fn view_model(&self, name: &str) -> Access<InstanceRef> {
        Ok(call(&self.object, "viewModel", name, Some(&JsValue::from_str(name)))?.map(instance_ref))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A view-model definition object.
#[derive(Debug)]
pub struct JsDefinition {
    object: JsValue,
}

impl ViewModelDefinition for JsDefinition {
    fn name(&self) -> Option<String> {
        get_string(&self.object, "name")
    }

    fn default_instance(&self) -> Access<InstanceRef> {
        Ok(call(&self.object, "defaultInstance", "", None)?.map(instance_ref))
    }

    fn instance_count(&self) -> Result<usize, AccessError> {
        let raw = get(&self.object, "instanceCount", "instanceCount")?;
        Ok(raw.as_f64().filter(|n| *n > 0.0).map_or(0, |n| n as usize))
    }

    fn instance_at(&self, index: usize) -> Access<InstanceRef> {
        let arg = JsValue::from_f64(index as f64);
        Ok(call(&self.object, "instanceByIndex", "", Some(&arg))?.map(instance_ref))
    }
}

/// A state-machine input object.
#[derive(Debug)]
pub struct JsInput {
    object: JsValue,
    name: String,
    kind: InputKind,
}

impl JsInput {
    pub fn new(object: JsValue) -> Self {
        let name = get_string(&object, "name").unwrap_or_default();
        let kind = Reflect::get(&object, &JsValue::from_str("type"))
            .map(|t| input_kind(&t))
            .unwrap_or_else(|_| InputKind::Other(String::new()));
        Self { object, name, kind }
    }

    pub fn object(&self) -> &JsValue {
        &self.object
    }
}

/// Input types arrive either as the runtime's numeric codes or as names.
fn input_kind(raw: &JsValue) -> InputKind {
    if let Some(code) = raw.as_f64() {
        return if code == INPUT_TYPE_NUMBER {
            InputKind::Number
        } else if code == INPUT_TYPE_TRIGGER {
            InputKind::Trigger
        } else if code == INPUT_TYPE_BOOLEAN {
            InputKind::Boolean
        } else {
            InputKind::Other(code.to_string())
        };
    }
    raw.as_string()
        .map(|s| InputKind::parse(&s))
        .unwrap_or_else(|| InputKind::Other(type_name(raw)))
}

impl StateMachineInput for JsInput {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> InputKind {
        self.kind.clone()
    }

    fn value(&self) -> Result<Value, AccessError> {
        let raw = get(&self.object, "value", "value")?;
        let mismatch = |expected: &'static str| AccessError::TypeMismatch {
            expected,
            found: type_name(&raw),
        };
        match self.kind {
            InputKind::Boolean => raw.as_bool().map(Value::Bool).ok_or_else(|| mismatch("boolean")),
            InputKind::Number => raw.as_f64().map(Value::Number).ok_or_else(|| mismatch("number")),
            InputKind::Trigger => Ok(Value::Trigger),
            InputKind::Other(_) => Err(mismatch("boolean or number")),
        }
    }

    fn set_value(&self, value: Value) -> Result<(), AccessError> {
        if self.kind == InputKind::Trigger {
            return self.fire();
        }
        write_value(&self.object, &self.name, &value)
    }

    fn fire(&self) -> Result<(), AccessError> {
        call(&self.object, "fire", &self.name, None).map(|_| ())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The Rive runtime object itself.
#[derive(Debug)]
pub struct JsRuntime {
    object: JsValue,
}

impl JsRuntime {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }
}

impl RuntimeHandle for JsRuntime {
    fn artboard_name(&self) -> Option<String> {
        get_string(&self.object, "activeArtboard")
    }

    fn playing_state_machine_names(&self) -> Vec<String> {
        Reflect::get(&self.object, &JsValue::from_str("playingStateMachineNames"))
            .ok()
            .and_then(|v| v.dyn_into::<Array>().ok())
            .map(|list| list.iter().filter_map(|v| v.as_string()).collect())
            .unwrap_or_default()
    }

    fn bound_instance(&self) -> Access<InstanceRef> {
        let raw = get(&self.object, "viewModelInstance", "viewModelInstance")?;
        Ok((!is_nullish(&raw)).then(|| instance_ref(raw)))
    }

    fn field_instance(&self, field: &str) -> Access<InstanceRef> {
        let raw = get(&self.object, field, "field")?;
        Ok(raw.is_object().then(|| instance_ref(raw)))
    }

    fn artboard_default_view_model(&self, artboard: &str) -> Access<DefinitionRef> {
        let found = call(
            &self.object,
            "artboardDefaultViewModel",
            artboard,
            Some(&JsValue::from_str(artboard)),
        )?;
        Ok(found.map(|object| Rc::new(JsDefinition { object }) as DefinitionRef))
    }

    fn default_view_model(&self) -> Access<DefinitionRef> {
        let found = call(&self.object, "defaultViewModel", "", None)?;
        Ok(found.map(|object| Rc::new(JsDefinition { object }) as DefinitionRef))
    }

    fn state_machine_inputs(&self, state_machine: &str) -> Result<Vec<InputRef>, AccessError> {
        let found = call(
            &self.object,
            "stateMachineInputs",
            state_machine,
            Some(&JsValue::from_str(state_machine)),
        )?;
        let Some(raw) = found else {
            return Ok(Vec::new());
        };
        let list = raw.dyn_into::<Array>().map_err(|other| AccessError::TypeMismatch {
            expected: "array",
            found: type_name(&other),
        })?;
        Ok(list
            .iter()
            .filter(|v| v.is_object())
            .map(|v| Rc::new(JsInput::new(v)) as InputRef)
            .collect())
    }
}
