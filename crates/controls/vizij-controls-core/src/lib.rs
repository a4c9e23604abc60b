//! vizij-controls: runtime graph connector for Rive documents (engine-agnostic).
//!
//! The connector reconciles a static [`DocumentDescriptor`] (produced once by a
//! design-time parser) with a live [`RuntimeHandle`] into a single
//! [`ControlTree`] a UI layer binds to. State-machine inputs and view-model
//! properties, including nested view models, end up in the same tree.
//!
//! Live bindings are optional: every runtime call may fail, and when no root
//! view-model instance can be reached the connector falls back to a read-only
//! placeholder tree built from the descriptor alone.

pub mod builder;
pub mod config;
pub mod connector;
pub mod control;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod kind;
pub mod memory;
pub mod metadata;
pub mod placeholder;
pub mod resolve;
pub mod runtime;
pub mod state_machine;
pub mod value;
pub mod verify;

pub use builder::TreeBuilder;
pub use config::ConnectorConfig;
pub use connector::{connect, ActiveSelection, Connector};
pub use control::{
    ControlNode, ControlTree, ControlTreeSnapshot, InputControl, LivePropertyControl,
    NodeBinding, PlaceholderPropertyControl, StateMachineControl,
};
pub use descriptor::{
    ArtboardDescriptor, BlueprintDescriptor, DocumentDescriptor, InputDescriptor,
    PropertyDescriptor, StateMachineDescriptor,
};
pub use dispatch::read_live_property;
pub use error::{AccessError, DescriptorError};
pub use kind::{InputKind, PropertyKind};
pub use metadata::{
    enum_values, resolve_enum_type_name, resolve_nested_blueprint_name, BlueprintCatalog,
    NestedLookup, NESTED_BLUEPRINT_SOURCES,
};
pub use placeholder::build_placeholder;
pub use resolve::{
    resolve_root, resolve_root_with, RootResolution, RootStrategy, ROOT_STRATEGIES,
};
pub use runtime::{
    Access, DefinitionRef, InputRef, InstanceRef, LiveProperty, LivePropertyRef, PropertyInfo,
    RuntimeHandle, StateMachineInput, ViewModelDefinition, ViewModelInstance,
};
pub use state_machine::build_state_machine_controls;
pub use value::{RawValue, Value};
pub use verify::{probe_binding, verify_binding, ProbeFailure, ProbeReport};
