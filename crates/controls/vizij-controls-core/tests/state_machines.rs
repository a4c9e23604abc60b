use std::rc::Rc;

use vizij_controls::memory::{MemoryInput, MemoryRuntime};
use vizij_controls::{
    build_state_machine_controls, connect, ActiveSelection, ConnectorConfig, DocumentDescriptor,
    InputKind, RawValue, RuntimeHandle, Value,
};

fn dashboard() -> DocumentDescriptor {
    vizij_test_fixtures::descriptors::load("dashboard").expect("dashboard fixture")
}

fn names(
    rt: &MemoryRuntime,
    doc: &DocumentDescriptor,
    config: &ConnectorConfig,
) -> Vec<(String, bool)> {
    build_state_machine_controls(
        rt,
        Some(doc),
        Some("Dashboard"),
        &rt.playing_state_machine_names(),
        config,
    )
    .into_iter()
    .map(|sm| (sm.name, sm.is_active))
    .collect()
}

#[test]
fn playing_machines_with_inputs_become_controls() {
    let doc = dashboard();
    let level = MemoryInput::number("level", 0.0);
    let rt = MemoryRuntime::new()
        .with_artboard("Dashboard")
        .with_state_machine(
            "Main SM",
            vec![
                MemoryInput::boolean("isHovered", false),
                level.clone(),
                MemoryInput::trigger("pulse"),
            ],
        )
        .with_state_machine("Empty SM", Vec::new())
        .with_idle_state_machine("Idle SM", vec![MemoryInput::trigger("blink")]);

    let tree = connect(Some(&doc), Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    assert_eq!(tree.active_state_machine_names, ["Main SM", "Empty SM"]);
    assert_eq!(tree.state_machine_controls.len(), 1);
    let main = tree.state_machine("Main SM").expect("main controls");
    assert!(main.is_active);
    let input_names: Vec<&str> = main.inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(input_names, ["isHovered", "level", "pulse"]);

    let level_control = main.input("level").unwrap();
    assert_eq!(level_control.kind, InputKind::Number);
    assert_eq!(
        Rc::as_ptr(&level_control.live_input) as *const (),
        Rc::as_ptr(&level) as *const ()
    );
    let parsed = level_control.parsed_info.as_ref().expect("parsed info");
    assert_eq!(parsed.kind, InputKind::Number);
    assert_eq!(parsed.value, Some(RawValue::Number(0.0)));

    level_control.live_input.set_value(Value::Number(3.0)).unwrap();
    assert_eq!(main.input("level").unwrap().live_input.value().unwrap(), Value::Number(3.0));
}

#[test]
fn inputs_missing_from_descriptor_have_no_parsed_info() {
    let doc = dashboard();
    let rt = MemoryRuntime::new().with_state_machine(
        "Main SM",
        vec![MemoryInput::boolean("isHovered", true), MemoryInput::number("extra", 1.0)],
    );

    let controls = build_state_machine_controls(
        &rt,
        Some(&doc),
        Some("Dashboard"),
        &["Main SM".to_string()],
        &ConnectorConfig::default(),
    );

    let main = &controls[0];
    assert!(main.input("isHovered").unwrap().parsed_info.is_some());
    assert!(main.input("extra").unwrap().parsed_info.is_none());
}

#[test]
fn machine_unknown_to_descriptor_still_gets_controls() {
    let doc = dashboard();
    let rt =
        MemoryRuntime::new().with_state_machine("Runtime Only", vec![MemoryInput::trigger("go")]);

    let controls = build_state_machine_controls(
        &rt,
        Some(&doc),
        Some("Dashboard"),
        &["Runtime Only".to_string()],
        &ConnectorConfig::default(),
    );

    assert_eq!(controls.len(), 1);
    assert!(controls[0].inputs[0].parsed_info.is_none());
}

#[test]
fn failing_machine_is_omitted() {
    let doc = dashboard();
    let rt = MemoryRuntime::new()
        .with_state_machine("Main SM", vec![MemoryInput::boolean("isHovered", false)])
        .with_state_machine("Broken", vec![MemoryInput::trigger("x")])
        .with_failing_state_machine("Broken");

    assert_eq!(
        names(&rt, &doc, &ConnectorConfig::default()),
        [("Main SM".to_string(), true)]
    );
}

#[test]
fn inactive_machines_are_opt_in() {
    let doc = dashboard();
    let rt = MemoryRuntime::new()
        .with_state_machine("Main SM", vec![MemoryInput::boolean("isHovered", false)])
        .with_idle_state_machine("Idle SM", vec![MemoryInput::trigger("blink")]);

    assert_eq!(
        names(&rt, &doc, &ConnectorConfig::default()),
        [("Main SM".to_string(), true)]
    );

    let config = ConnectorConfig {
        include_inactive_state_machines: true,
        ..ConnectorConfig::default()
    };
    assert_eq!(
        names(&rt, &doc, &config),
        [("Main SM".to_string(), true), ("Idle SM".to_string(), false)]
    );
}

#[test]
fn trigger_inputs_fire_through_the_tree() {
    let pulse = MemoryInput::trigger("pulse");
    let rt = MemoryRuntime::new().with_state_machine("Main SM", vec![pulse.clone()]);

    let tree = connect(None, Some(&rt as &dyn RuntimeHandle), &ActiveSelection::default());

    let control = tree.state_machine("Main SM").unwrap().input("pulse").unwrap();
    assert_eq!(control.kind, InputKind::Trigger);
    control.live_input.fire().unwrap();
    assert_eq!(pulse.fire_count(), 1);
}

#[test]
fn selection_overrides_playing_list() {
    let rt = MemoryRuntime::new()
        .with_state_machine("Main SM", vec![MemoryInput::boolean("a", false)])
        .with_idle_state_machine("Idle SM", vec![MemoryInput::trigger("blink")]);

    let tree = connect(
        None,
        Some(&rt as &dyn RuntimeHandle),
        &ActiveSelection::default().with_state_machine("Idle SM"),
    );

    assert_eq!(tree.active_state_machine_names, ["Idle SM"]);
    assert_eq!(tree.state_machine_controls.len(), 1);
    assert_eq!(tree.state_machine_controls[0].name, "Idle SM");
}

#[test]
fn no_runtime_means_no_state_machine_controls() {
    let doc: DocumentDescriptor =
        vizij_test_fixtures::descriptors::load("no-view-models").expect("fixture");
    let tree = connect(Some(&doc), None, &ActiveSelection::default());
    assert!(tree.state_machine_controls.is_empty());
    assert!(tree.is_empty());
}
