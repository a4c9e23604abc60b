use std::rc::Rc;

use vizij_controls::memory::{MemoryInstance, MemoryProperty, MemoryRuntime, MemoryStep};
use vizij_controls::{
    connect, ActiveSelection, Connector, ConnectorConfig, DocumentDescriptor, PropertyKind,
    RuntimeHandle, Value,
};

fn descriptor(name: &str) -> DocumentDescriptor {
    let json = vizij_test_fixtures::descriptors::json(name).expect("load descriptor fixture");
    DocumentDescriptor::from_json(&json).expect("parse descriptor fixture")
}

fn addr<T: ?Sized>(rc: &Rc<T>) -> *const () {
    Rc::as_ptr(rc) as *const ()
}

#[test]
fn live_boolean_property_is_bound_by_reference() {
    let doc = descriptor("single-boolean");
    let active = MemoryProperty::boolean(false);
    let root = Rc::new(MemoryInstance::named("MainVM").with_property("Active", active.clone()));
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_bound_instance(root);

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    assert_eq!(tree.active_artboard_name.as_deref(), Some("Main"));
    assert_eq!(tree.active_view_model_name.as_deref(), Some("MainVM"));
    let node = tree.root().expect("root node");
    assert!(!node.is_placeholder());
    assert!(node.live_instance().is_some());
    assert_eq!(node.instance_name, "Default");

    let props = node.live_properties();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].name, "Active");
    assert_eq!(props[0].kind, PropertyKind::Boolean);
    assert_eq!(props[0].live_property.value().unwrap(), Value::Bool(false));
    assert_eq!(addr(&props[0].live_property), addr(&active));

    // The binding probe flipped and restored the value.
    assert_eq!(active.write_count(), 2);
    assert_eq!(active.current(), Value::Bool(false));
}

#[test]
fn throwing_accessor_leaves_properties_empty() {
    let doc = descriptor("single-boolean");
    let root = Rc::new(
        MemoryInstance::named("MainVM")
            .with_property("Active", MemoryProperty::boolean(false))
            .with_failing("Active"),
    );
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_bound_instance(root);

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    let node = tree.root().expect("root node still emitted");
    assert!(!node.is_placeholder());
    assert!(node.live_properties().is_empty());
}

#[test]
fn missing_runtime_builds_placeholder_tree() {
    let doc = descriptor("nested-sub");

    let tree = connect(Some(&doc), None, &ActiveSelection::default());

    assert_eq!(tree.active_artboard_name.as_deref(), Some("Main"));
    assert!(tree.state_machine_controls.is_empty());
    let root = tree.root().expect("placeholder root");
    assert!(root.is_placeholder());
    assert!(root.live_instance().is_none());
    assert_eq!(root.nested_view_models.len(), 1);
    let sub = &root.nested_view_models[0];
    assert_eq!(sub.instance_name, "Sub");
    assert!(sub.is_placeholder());
    assert_eq!(
        sub.placeholder_property("label").unwrap().value,
        Some(Value::Text("hello".into()))
    );
    assert!(root.placeholder_property("Sub").is_none());
}

#[test]
fn unresolvable_root_falls_back_to_placeholder() {
    let doc = descriptor("single-boolean");
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_failing_step(MemoryStep::BoundInstance)
        .with_failing_step(MemoryStep::DefaultViewModel);

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    let root = tree.root().expect("placeholder root");
    assert!(root.is_placeholder());
    assert!(root.live_instance().is_none());
    assert_eq!(
        root.placeholder_property("Active").unwrap().value,
        Some(Value::Bool(false))
    );
}

#[test]
fn no_blueprint_and_no_root_yields_empty_view_models() {
    let doc = descriptor("no-view-models");
    let rt = MemoryRuntime::new().with_artboard("Main");

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    assert!(tree.view_model_controls.is_empty());
    assert!(tree.active_view_model_name.is_none());
}

#[test]
fn nothing_supplied_yields_empty_tree() {
    let tree = connect(None, None, &ActiveSelection::default());
    assert!(tree.is_empty());
    assert!(tree.active_artboard_name.is_none());
}

#[test]
fn live_build_without_descriptor_uses_runtime_names() {
    let root = Rc::new(
        MemoryInstance::named("PlayerVM")
            .with_property("mood", MemoryProperty::enumeration("calm"))
            .with_property("score", MemoryProperty::number(3.0)),
    );
    let rt = MemoryRuntime::new()
        .with_artboard("Stage")
        .with_bound_instance(root);

    let tree = connect(None, Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    assert_eq!(tree.active_artboard_name.as_deref(), Some("Stage"));
    let node = tree.root().expect("live root");
    assert_eq!(node.instance_name, "PlayerVM");
    let mood = node.live_property("mood").unwrap();
    assert_eq!(mood.enum_type_name.as_deref(), Some("mood"));
}

#[test]
fn selection_overrides_runtime_artboard() {
    let doc = descriptor("nested-sub");
    let rt = MemoryRuntime::new().with_artboard("Elsewhere");

    let tree = connect(
        Some(&doc),
        Some(&rt as &dyn RuntimeHandle),
        &ActiveSelection::artboard("Main"),
    );

    assert_eq!(tree.active_artboard_name.as_deref(), Some("Main"));
    assert!(tree.root().unwrap().is_placeholder());
}

#[test]
fn verification_can_be_disabled() {
    let doc = descriptor("single-boolean");
    let active = MemoryProperty::boolean(true);
    let root = Rc::new(MemoryInstance::named("MainVM").with_property("Active", active.clone()));
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_bound_instance(root);
    let connector = Connector::new(ConnectorConfig {
        verify_bindings: false,
        ..ConnectorConfig::default()
    });

    let tree = connector.connect(
        Some(&doc),
        Some(&rt as &dyn RuntimeHandle),
        &ActiveSelection::default(),
    );

    assert_eq!(tree.root().unwrap().live_properties().len(), 1);
    assert_eq!(active.write_count(), 0);
}

#[test]
fn snapshot_serializes_current_values() {
    let doc = descriptor("single-boolean");
    let active = MemoryProperty::boolean(false);
    let root = Rc::new(MemoryInstance::named("MainVM").with_property("Active", active.clone()));
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_bound_instance(root);

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());
    tree.root().unwrap().live_properties()[0]
        .live_property
        .set_value(Value::Bool(true))
        .unwrap();

    let json = serde_json::to_value(tree.snapshot()).expect("serialize snapshot");
    assert_eq!(json["activeArtboardName"], "Main");
    let prop = &json["viewModels"][0]["properties"][0];
    assert_eq!(prop["name"], "Active");
    assert_eq!(prop["type"], "boolean");
    assert_eq!(prop["value"], serde_json::json!({ "type": "bool", "data": true }));
    assert_eq!(json["viewModels"][0]["isPlaceholder"], false);
}

#[test]
fn configured_probe_property_is_the_one_probed() {
    let count = MemoryProperty::number(1.0);
    let label = MemoryProperty::string("hi");
    let root = Rc::new(
        MemoryInstance::named("MainVM")
            .with_property("count", count.clone())
            .with_property("label", label.clone()),
    );
    let rt = MemoryRuntime::new()
        .with_artboard("Main")
        .with_bound_instance(root);
    let config = ConnectorConfig {
        probe_property: Some("label".into()),
        ..ConnectorConfig::default()
    };

    let tree = Connector::new(config).connect(
        None,
        Some(&rt as &dyn RuntimeHandle),
        &ActiveSelection::default(),
    );

    assert!(tree.root().is_some());
    assert_eq!(label.write_count(), 2);
    assert_eq!(count.write_count(), 0);
    assert_eq!(label.current(), Value::Text("hi".into()));
}

#[test]
fn every_fixture_parses_and_opens_on_its_artboard() {
    for key in vizij_test_fixtures::descriptors::keys() {
        let doc = descriptor(&key);
        if let Some(artboard) = vizij_test_fixtures::descriptors::artboard(&key).unwrap() {
            assert!(doc.artboard(&artboard).is_some(), "{key}: no artboard `{artboard}`");
            let tree = connect(Some(&doc), None, &ActiveSelection::default());
            assert_eq!(tree.active_artboard_name.as_deref(), Some(artboard.as_str()));
        }
    }
}
