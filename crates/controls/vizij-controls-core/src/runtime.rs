//! Capability traits over a live animation runtime.
//!
//! The connector never owns runtime state; it only holds shared handles into
//! it. Every capability returns [`Access`]: `Err` where the runtime fails,
//! `Ok(None)` where it has nothing to offer. Optional capabilities default to
//! [`AccessError::Unsupported`] so adapters only implement what their runtime
//! actually exposes.
//!
//! Handles are `Rc` because the UI keeps the very same handle the connector
//! tested; identity is observable through `Rc::ptr_eq`. Mutation goes through
//! `&self`, runtimes use interior mutability.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::AccessError;
use crate::kind::{InputKind, PropertyKind};
use crate::value::Value;

pub type Access<T> = Result<Option<T>, AccessError>;

pub type LivePropertyRef = Rc<dyn LiveProperty>;
pub type InstanceRef = Rc<dyn ViewModelInstance>;
pub type DefinitionRef = Rc<dyn ViewModelDefinition>;
pub type InputRef = Rc<dyn StateMachineInput>;

/// One entry of a view-model instance's property list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub kind: PropertyKind,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Two-way binding endpoint for a single view-model property.
pub trait LiveProperty: fmt::Debug {
    fn value(&self) -> Result<Value, AccessError>;

    fn set_value(&self, value: Value) -> Result<(), AccessError>;

    /// Fire a trigger property.
    fn fire(&self) -> Result<(), AccessError> {
        self.set_value(Value::Trigger)
    }

    /// Lets boundary layers recover their concrete handle type.
    fn as_any(&self) -> &dyn Any;
}

/// A live view-model instance.
pub trait ViewModelInstance: fmt::Debug {
    /// Blueprint name the runtime reports for this instance, if any.
    fn name(&self) -> Option<String> {
        None
    }

    /// Ordered property list as declared by the runtime.
    fn properties(&self) -> Result<Vec<PropertyInfo>, AccessError>;

    fn boolean(&self, name: &str) -> Access<LivePropertyRef>;

    fn number(&self, name: &str) -> Access<LivePropertyRef>;

    fn string(&self, name: &str) -> Access<LivePropertyRef>;

    fn color(&self, _name: &str) -> Access<LivePropertyRef> {
        Err(AccessError::unsupported("color"))
    }

    fn enumeration(&self, _name: &str) -> Access<LivePropertyRef> {
        Err(AccessError::unsupported("enum"))
    }

    fn trigger(&self, _name: &str) -> Access<LivePropertyRef> {
        Err(AccessError::unsupported("trigger"))
    }

    fn view_model(&self, name: &str) -> Access<InstanceRef>;

    fn as_any(&self) -> &dyn Any;
}

/// A view-model definition (blueprint) able to produce instances.
pub trait ViewModelDefinition: fmt::Debug {
    fn name(&self) -> Option<String> {
        None
    }

    /// The definition's default-instance factory.
    fn default_instance(&self) -> Access<InstanceRef>;

    fn instance_count(&self) -> Result<usize, AccessError> {
        Ok(0)
    }

    fn instance_at(&self, _index: usize) -> Access<InstanceRef> {
        Ok(None)
    }
}

/// A live state-machine input.
pub trait StateMachineInput: fmt::Debug {
    fn name(&self) -> String;

    fn kind(&self) -> InputKind;

    fn value(&self) -> Result<Value, AccessError>;

    fn set_value(&self, value: Value) -> Result<(), AccessError>;

    fn fire(&self) -> Result<(), AccessError> {
        Err(AccessError::unsupported("fire"))
    }

    fn as_any(&self) -> &dyn Any;
}

/// Handle onto a loaded, running document.
pub trait RuntimeHandle {
    /// Artboard the runtime is currently showing.
    fn artboard_name(&self) -> Option<String> {
        None
    }

    /// State machines the runtime is currently playing, in order.
    fn playing_state_machine_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Instance currently bound to the artboard.
    fn bound_instance(&self) -> Access<InstanceRef>;

    /// Instance stored on the handle under `field` (hosts key these by
    /// artboard name).
    fn field_instance(&self, _field: &str) -> Access<InstanceRef> {
        Ok(None)
    }

    /// Default view-model definition of `artboard`.
    fn artboard_default_view_model(&self, _artboard: &str) -> Access<DefinitionRef> {
        Err(AccessError::unsupported("artboardDefaultViewModel"))
    }

    /// Default view-model definition of the loaded document.
    fn default_view_model(&self) -> Access<DefinitionRef>;

    fn state_machine_inputs(&self, state_machine: &str) -> Result<Vec<InputRef>, AccessError>;
}

/// Address of the object behind an `Rc`, ignoring vtable metadata.
pub(crate) fn handle_addr<T: ?Sized>(rc: &Rc<T>) -> *const () {
    Rc::as_ptr(rc) as *const ()
}
