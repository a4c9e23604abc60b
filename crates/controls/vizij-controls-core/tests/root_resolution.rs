use std::rc::Rc;

use vizij_controls::memory::{MemoryDefinition, MemoryInstance, MemoryRuntime, MemoryStep};
use vizij_controls::{
    resolve_root, resolve_root_with, InstanceRef, RootStrategy, ViewModelInstance,
};

fn instance(name: &str) -> InstanceRef {
    Rc::new(MemoryInstance::named(name))
}

fn resolved_name(rt: &MemoryRuntime, artboard: Option<&str>) -> Option<(String, RootStrategy)> {
    resolve_root(rt, artboard).map(|r| (r.instance.name().unwrap_or_default(), r.strategy))
}

#[test]
fn bound_instance_wins_over_everything() {
    let rt = MemoryRuntime::new()
        .with_bound_instance(instance("Bound"))
        .with_field("Main", instance("Field"))
        .with_default_view_model(Rc::new(
            MemoryDefinition::new("Doc").with_default_instance(instance("DocDefault")),
        ));

    assert_eq!(
        resolved_name(&rt, Some("Main")),
        Some(("Bound".to_string(), RootStrategy::BoundInstance))
    );
}

#[test]
fn artboard_field_beats_artboard_default() {
    let rt = MemoryRuntime::new()
        .with_field("Main", instance("A"))
        .with_artboard_default(
            "Main",
            Rc::new(MemoryDefinition::new("MainVM").with_default_instance(instance("B"))),
        );

    assert_eq!(
        resolved_name(&rt, Some("Main")),
        Some(("A".to_string(), RootStrategy::ArtboardField))
    );
}

#[test]
fn failing_step_moves_on_to_the_next() {
    let rt = MemoryRuntime::new()
        .with_bound_instance(instance("Bound"))
        .with_failing_step(MemoryStep::BoundInstance)
        .with_failing_step(MemoryStep::Field)
        .with_artboard_default(
            "Main",
            Rc::new(MemoryDefinition::new("MainVM").with_default_instance(instance("B"))),
        );

    assert_eq!(
        resolved_name(&rt, Some("Main")),
        Some(("B".to_string(), RootStrategy::ArtboardDefault))
    );
}

#[test]
fn artboard_scoped_strategies_need_an_artboard() {
    let rt = MemoryRuntime::new()
        .with_field("Main", instance("A"))
        .with_default_view_model(Rc::new(
            MemoryDefinition::new("Doc").with_default_instance(instance("DocDefault")),
        ));

    assert_eq!(
        resolved_name(&rt, None),
        Some(("DocDefault".to_string(), RootStrategy::DefaultViewModel))
    );
}

#[test]
fn document_default_falls_back_to_first_instance() {
    let rt = MemoryRuntime::new().with_default_view_model(Rc::new(
        MemoryDefinition::new("Doc")
            .with_failing_default()
            .with_instance(instance("First"))
            .with_instance(instance("Second")),
    ));

    assert_eq!(
        resolved_name(&rt, Some("Main")),
        Some(("First".to_string(), RootStrategy::DefaultViewModel))
    );
}

#[test]
fn exhausted_strategies_resolve_to_none() {
    let empty_definition = Rc::new(MemoryDefinition::new("Doc"));
    let rt = MemoryRuntime::new()
        .with_failing_step(MemoryStep::BoundInstance)
        .with_artboard_default("Main", empty_definition.clone())
        .with_default_view_model(empty_definition);

    assert!(resolve_root(&rt, Some("Main")).is_none());
}

#[test]
fn custom_strategy_order_is_respected() {
    let rt = MemoryRuntime::new()
        .with_bound_instance(instance("Bound"))
        .with_field("Main", instance("Field"));

    let resolution = resolve_root_with(
        &rt,
        Some("Main"),
        &[RootStrategy::ArtboardField, RootStrategy::BoundInstance],
    )
    .expect("resolved");
    assert_eq!(resolution.strategy, RootStrategy::ArtboardField);
    assert_eq!(resolution.instance.name().as_deref(), Some("Field"));
}

#[test]
fn resolution_returns_the_runtime_handle() {
    let root = Rc::new(MemoryInstance::named("Bound"));
    let rt = MemoryRuntime::new().with_bound_instance(root.clone());

    let resolution = resolve_root(&rt, None).expect("resolved");
    assert_eq!(
        Rc::as_ptr(&resolution.instance) as *const (),
        Rc::as_ptr(&root) as *const ()
    );
}
