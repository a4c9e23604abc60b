//! In-memory runtime implementing the capability traits.
//!
//! Useful for hosts that drive controls without a real animation runtime and
//! for exercising the connector. Failures can be injected per accessor,
//! per capability and per resolution step.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use crate::error::AccessError;
use crate::kind::{InputKind, PropertyKind};
use crate::runtime::{
    Access, DefinitionRef, InputRef, InstanceRef, LiveProperty, LivePropertyRef, PropertyInfo,
    RuntimeHandle, StateMachineInput, ViewModelDefinition, ViewModelInstance,
};
use crate::value::Value;

/// A single property value with optional fault behaviour.
#[derive(Debug)]
pub struct MemoryProperty {
    kind: PropertyKind,
    value: RefCell<Value>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    drop_writes: Cell<bool>,
    writes: Cell<usize>,
    fired: Cell<usize>,
}

impl MemoryProperty {
    pub fn new(kind: PropertyKind, value: Value) -> Rc<Self> {
        Rc::new(Self {
            kind,
            value: RefCell::new(value),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
            drop_writes: Cell::new(false),
            writes: Cell::new(0),
            fired: Cell::new(0),
        })
    }

    pub fn boolean(v: bool) -> Rc<Self> {
        Self::new(PropertyKind::Boolean, Value::Bool(v))
    }

    pub fn number(v: f64) -> Rc<Self> {
        Self::new(PropertyKind::Number, Value::Number(v))
    }

    pub fn string(v: &str) -> Rc<Self> {
        Self::new(PropertyKind::String, Value::Text(v.to_string()))
    }

    pub fn color(argb: u32) -> Rc<Self> {
        Self::new(PropertyKind::Color, Value::Color(argb))
    }

    pub fn enumeration(v: &str) -> Rc<Self> {
        Self::new(PropertyKind::Enum, Value::Enum(v.to_string()))
    }

    pub fn trigger() -> Rc<Self> {
        Self::new(PropertyKind::Trigger, Value::Trigger)
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Current value, bypassing fault injection.
    pub fn current(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Successful writes so far (including the probe's write and restore).
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn fire_count(&self) -> usize {
        self.fired.get()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Accept writes without storing them, like a disconnected binding.
    pub fn set_drop_writes(&self, drop: bool) {
        self.drop_writes.set(drop);
    }
}

impl LiveProperty for MemoryProperty {
    fn value(&self) -> Result<Value, AccessError> {
        if self.fail_reads.get() {
            return Err(AccessError::failed("value", self.kind.as_str(), "read rejected"));
        }
        Ok(self.current())
    }

    fn set_value(&self, value: Value) -> Result<(), AccessError> {
        if self.fail_writes.get() {
            return Err(AccessError::failed("setValue", self.kind.as_str(), "write rejected"));
        }
        if self.kind == PropertyKind::Trigger {
            self.fired.set(self.fired.get() + 1);
            return Ok(());
        }
        if value.kind() != self.kind {
            return Err(AccessError::TypeMismatch {
                expected: "matching property kind",
                found: value.kind().to_string(),
            });
        }
        if !self.drop_writes.get() {
            *self.value.borrow_mut() = value;
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Property(Rc<MemoryProperty>),
    ViewModel(Rc<MemoryInstance>),
    /// Declared in the property list but never returned by an accessor.
    Unbacked,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    kind: PropertyKind,
    slot: Slot,
}

/// How an accessor capability of [`MemoryInstance`] misbehaves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapabilityFault {
    /// The runtime does not offer the accessor at all.
    Unsupported,
    /// The accessor throws for every name.
    Throws,
    /// The accessor answers with no handle.
    Empty,
}

/// A view-model instance holding properties and nested instances.
#[derive(Debug, Default)]
pub struct MemoryInstance {
    name: Option<String>,
    entries: RefCell<Vec<Entry>>,
    failing: RefCell<HashSet<String>>,
    faults: RefCell<HashMap<&'static str, CapabilityFault>>,
    fail_property_list: Cell<bool>,
}

impl MemoryInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance that reports `name` as its blueprint.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_property(self, name: &str, property: Rc<MemoryProperty>) -> Self {
        self.add_property(name, property);
        self
    }

    pub fn with_view_model(self, name: &str, nested: Rc<MemoryInstance>) -> Self {
        self.add_view_model(name, nested);
        self
    }

    /// Declare `name` in the property list without backing it.
    pub fn with_unbacked(self, name: &str, kind: PropertyKind) -> Self {
        self.entries.borrow_mut().push(Entry {
            name: name.to_string(),
            kind,
            slot: Slot::Unbacked,
        });
        self
    }

    /// Every accessor call for `name` fails.
    pub fn with_failing(self, name: &str) -> Self {
        self.failing.borrow_mut().insert(name.to_string());
        self
    }

    /// Calls to `capability` report it as unsupported (`"enum"`, `"trigger"`,
    /// `"color"`, ...).
    pub fn without_capability(self, capability: &'static str) -> Self {
        self.with_capability_fault(capability, CapabilityFault::Unsupported)
    }

    pub fn with_capability_fault(self, capability: &'static str, fault: CapabilityFault) -> Self {
        self.faults.borrow_mut().insert(capability, fault);
        self
    }

    pub fn with_failing_property_list(self) -> Self {
        self.fail_property_list.set(true);
        self
    }

    pub fn add_property(&self, name: &str, property: Rc<MemoryProperty>) {
        self.entries.borrow_mut().push(Entry {
            name: name.to_string(),
            kind: property.kind().clone(),
            slot: Slot::Property(property),
        });
    }

    /// Attach a nested instance. Works through `&self`, so an instance can be
    /// linked back into its own subtree.
    pub fn add_view_model(&self, name: &str, nested: Rc<MemoryInstance>) {
        self.entries.borrow_mut().push(Entry {
            name: name.to_string(),
            kind: PropertyKind::ViewModel,
            slot: Slot::ViewModel(nested),
        });
    }

    pub fn property(&self, name: &str) -> Option<Rc<MemoryProperty>> {
        self.entries
            .borrow()
            .iter()
            .find_map(|e| match &e.slot {
                Slot::Property(p) if e.name == name => Some(p.clone()),
                _ => None,
            })
    }

    fn lookup(
        &self,
        capability: &'static str,
        name: &str,
        accepts: &[PropertyKind],
    ) -> Access<LivePropertyRef> {
        if self.guard(capability, name)?.is_none() {
            return Ok(None);
        }
        let found = self.entries.borrow().iter().find_map(|e| match &e.slot {
            Slot::Property(p) if e.name == name && accepts.contains(p.kind()) => {
                Some(p.clone() as LivePropertyRef)
            }
            _ => None,
        });
        Ok(found)
    }

    /// `Ok(None)` when the capability is faulted to answer with nothing.
    fn guard(&self, capability: &'static str, name: &str) -> Access<()> {
        match self.faults.borrow().get(capability) {
            Some(CapabilityFault::Unsupported) => {
                return Err(AccessError::unsupported(capability));
            }
            Some(CapabilityFault::Throws) => {
                return Err(AccessError::failed(capability, name, "accessor threw"));
            }
            Some(CapabilityFault::Empty) => return Ok(None),
            None => {}
        }
        if self.failing.borrow().contains(name) {
            return Err(AccessError::failed(capability, name, "accessor threw"));
        }
        Ok(Some(()))
    }
}

impl ViewModelInstance for MemoryInstance {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn properties(&self) -> Result<Vec<PropertyInfo>, AccessError> {
        if self.fail_property_list.get() {
            return Err(AccessError::failed("properties", "", "property list threw"));
        }
        Ok(self
            .entries
            .borrow()
            .iter()
            .map(|e| PropertyInfo::new(e.name.clone(), e.kind.clone()))
            .collect())
    }

    fn boolean(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("boolean", name, &[PropertyKind::Boolean])
    }

    fn number(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("number", name, &[PropertyKind::Number])
    }

    /// Enum properties are readable as strings too.
    fn string(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("string", name, &[PropertyKind::String, PropertyKind::Enum])
    }

    fn color(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("color", name, &[PropertyKind::Color])
    }

    fn enumeration(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("enum", name, &[PropertyKind::Enum])
    }

    fn trigger(&self, name: &str) -> Access<LivePropertyRef> {
        self.lookup("trigger", name, &[PropertyKind::Trigger])
    }

    fn view_model(&self, name: &str) -> Access<InstanceRef> {
        if self.guard("viewModel", name)?.is_none() {
            return Ok(None);
        }
        let found = self.entries.borrow().iter().find_map(|e| match &e.slot {
            Slot::ViewModel(vm) if e.name == name => Some(vm.clone() as InstanceRef),
            _ => None,
        });
        Ok(found)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A view-model definition with a default instance and enumerable instances.
#[derive(Debug, Default)]
pub struct MemoryDefinition {
    name: Option<String>,
    default_instance: Option<InstanceRef>,
    instances: Vec<InstanceRef>,
    fail_default: bool,
}

impl MemoryDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_default_instance(mut self, instance: InstanceRef) -> Self {
        self.default_instance = Some(instance);
        self
    }

    pub fn with_instance(mut self, instance: InstanceRef) -> Self {
        self.instances.push(instance);
        self
    }

    /// The default-instance factory fails.
    pub fn with_failing_default(mut self) -> Self {
        self.fail_default = true;
        self
    }
}

impl ViewModelDefinition for MemoryDefinition {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn default_instance(&self) -> Access<InstanceRef> {
        if self.fail_default {
            return Err(AccessError::failed(
                "defaultInstance",
                self.name.clone().unwrap_or_default(),
                "factory threw",
            ));
        }
        Ok(self.default_instance.clone())
    }

    fn instance_count(&self) -> Result<usize, AccessError> {
        Ok(self.instances.len())
    }

    fn instance_at(&self, index: usize) -> Access<InstanceRef> {
        Ok(self.instances.get(index).cloned())
    }
}

/// A state-machine input.
#[derive(Debug)]
pub struct MemoryInput {
    name: String,
    kind: InputKind,
    value: RefCell<Value>,
    fired: Cell<usize>,
}

impl MemoryInput {
    pub fn new(name: &str, kind: InputKind, value: Value) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            kind,
            value: RefCell::new(value),
            fired: Cell::new(0),
        })
    }

    pub fn boolean(name: &str, v: bool) -> Rc<Self> {
        Self::new(name, InputKind::Boolean, Value::Bool(v))
    }

    pub fn number(name: &str, v: f64) -> Rc<Self> {
        Self::new(name, InputKind::Number, Value::Number(v))
    }

    pub fn trigger(name: &str) -> Rc<Self> {
        Self::new(name, InputKind::Trigger, Value::Trigger)
    }

    pub fn fire_count(&self) -> usize {
        self.fired.get()
    }
}

impl StateMachineInput for MemoryInput {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> InputKind {
        self.kind.clone()
    }

    fn value(&self) -> Result<Value, AccessError> {
        Ok(self.value.borrow().clone())
    }

    fn set_value(&self, value: Value) -> Result<(), AccessError> {
        if self.kind == InputKind::Trigger {
            return self.fire();
        }
        *self.value.borrow_mut() = value;
        Ok(())
    }

    fn fire(&self) -> Result<(), AccessError> {
        if self.kind != InputKind::Trigger {
            return Err(AccessError::TypeMismatch {
                expected: "trigger",
                found: self.kind.to_string(),
            });
        }
        self.fired.set(self.fired.get() + 1);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolution steps of [`MemoryRuntime`] that can be made to fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemoryStep {
    BoundInstance,
    Field,
    ArtboardDefault,
    DefaultViewModel,
}

/// Runtime handle over in-memory instances.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    artboard: Option<String>,
    playing: Vec<String>,
    bound: Option<InstanceRef>,
    fields: HashMap<String, InstanceRef>,
    artboard_defaults: HashMap<String, DefinitionRef>,
    default_view_model: Option<DefinitionRef>,
    state_machines: Vec<(String, Vec<InputRef>)>,
    failing_state_machines: HashSet<String>,
    failing_steps: HashSet<MemoryStep>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artboard(mut self, name: &str) -> Self {
        self.artboard = Some(name.to_string());
        self
    }

    pub fn with_bound_instance(mut self, instance: InstanceRef) -> Self {
        self.bound = Some(instance);
        self
    }

    pub fn with_field(mut self, field: &str, instance: InstanceRef) -> Self {
        self.fields.insert(field.to_string(), instance);
        self
    }

    pub fn with_artboard_default(mut self, artboard: &str, definition: DefinitionRef) -> Self {
        self.artboard_defaults.insert(artboard.to_string(), definition);
        self
    }

    pub fn with_default_view_model(mut self, definition: DefinitionRef) -> Self {
        self.default_view_model = Some(definition);
        self
    }

    /// Register a state machine and mark it as playing.
    pub fn with_state_machine(mut self, name: &str, inputs: Vec<InputRef>) -> Self {
        self.state_machines.push((name.to_string(), inputs));
        self.playing.push(name.to_string());
        self
    }

    /// Register a state machine that is not playing.
    pub fn with_idle_state_machine(mut self, name: &str, inputs: Vec<InputRef>) -> Self {
        self.state_machines.push((name.to_string(), inputs));
        self
    }

    pub fn with_failing_state_machine(mut self, name: &str) -> Self {
        self.failing_state_machines.insert(name.to_string());
        self
    }

    pub fn with_failing_step(mut self, step: MemoryStep) -> Self {
        self.failing_steps.insert(step);
        self
    }

    fn step<T>(&self, step: MemoryStep, value: Option<T>) -> Access<T> {
        if self.failing_steps.contains(&step) {
            return Err(AccessError::failed("resolve", format!("{step:?}"), "step threw"));
        }
        Ok(value)
    }
}

impl RuntimeHandle for MemoryRuntime {
    fn artboard_name(&self) -> Option<String> {
        self.artboard.clone()
    }

    fn playing_state_machine_names(&self) -> Vec<String> {
        self.playing.clone()
    }

    fn bound_instance(&self) -> Access<InstanceRef> {
        self.step(MemoryStep::BoundInstance, self.bound.clone())
    }

    fn field_instance(&self, field: &str) -> Access<InstanceRef> {
        self.step(MemoryStep::Field, self.fields.get(field).cloned())
    }

    fn artboard_default_view_model(&self, artboard: &str) -> Access<DefinitionRef> {
        self.step(
            MemoryStep::ArtboardDefault,
            self.artboard_defaults.get(artboard).cloned(),
        )
    }

    fn default_view_model(&self) -> Access<DefinitionRef> {
        self.step(MemoryStep::DefaultViewModel, self.default_view_model.clone())
    }

    fn state_machine_inputs(&self, state_machine: &str) -> Result<Vec<InputRef>, AccessError> {
        if self.failing_state_machines.contains(state_machine) {
            return Err(AccessError::failed(
                "stateMachineInputs",
                state_machine,
                "state machine threw",
            ));
        }
        Ok(self
            .state_machines
            .iter()
            .find(|(name, _)| name == state_machine)
            .map(|(_, inputs)| inputs.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_accessor_reads_enums() {
        let inst = MemoryInstance::new().with_property("mood", MemoryProperty::enumeration("calm"));
        assert!(inst.string("mood").unwrap().is_some());
        assert!(inst.number("mood").unwrap().is_none());
    }

    #[test]
    fn writes_of_the_wrong_kind_are_rejected() {
        let p = MemoryProperty::number(1.0);
        assert!(p.set_value(Value::Bool(true)).is_err());
        assert_eq!(p.current(), Value::Number(1.0));
    }

    #[test]
    fn dropped_writes_are_counted_but_not_stored() {
        let p = MemoryProperty::boolean(false);
        p.set_drop_writes(true);
        p.set_value(Value::Bool(true)).unwrap();
        assert_eq!(p.current(), Value::Bool(false));
        assert_eq!(p.write_count(), 1);
    }

    #[test]
    fn capability_faults() {
        let inst = MemoryInstance::new()
            .with_property("mood", MemoryProperty::enumeration("calm"))
            .with_capability_fault("enum", CapabilityFault::Throws)
            .with_capability_fault("number", CapabilityFault::Empty);
        assert!(inst.enumeration("mood").is_err());
        assert!(inst.number("mood").unwrap().is_none());
        assert!(inst.string("mood").unwrap().is_some());
    }

    #[test]
    fn trigger_inputs_fire() {
        let input = MemoryInput::trigger("jump");
        input.fire().unwrap();
        input.set_value(Value::Trigger).unwrap();
        assert_eq!(input.fire_count(), 2);
        assert!(MemoryInput::boolean("b", false).fire().is_err());
    }
}
