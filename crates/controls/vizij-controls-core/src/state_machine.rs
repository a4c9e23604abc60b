//! State-machine input controls.

use log::{debug, warn};

use crate::config::ConnectorConfig;
use crate::control::{InputControl, StateMachineControl};
use crate::descriptor::{DocumentDescriptor, StateMachineDescriptor};
use crate::runtime::RuntimeHandle;

/// One control group per state machine that exposes at least one live input.
/// Active machines come first, in `active` order. With
/// `include_inactive_state_machines`, the artboard's other descriptor machines
/// follow with `is_active = false`.
pub fn build_state_machine_controls(
    runtime: &dyn RuntimeHandle,
    descriptor: Option<&DocumentDescriptor>,
    artboard: Option<&str>,
    active: &[String],
    config: &ConnectorConfig,
) -> Vec<StateMachineControl> {
    let mut controls: Vec<StateMachineControl> = active
        .iter()
        .filter_map(|name| build_one(runtime, descriptor, artboard, name, true))
        .collect();

    if config.include_inactive_state_machines {
        let inactive = artboard
            .and_then(|a| descriptor.and_then(|d| d.artboard(a)))
            .map(|board| board.state_machines.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|sm| !active.contains(&sm.name));
        for sm in inactive {
            if let Some(control) = build_one(runtime, descriptor, artboard, &sm.name, false) {
                controls.push(control);
            }
        }
    }

    controls
}

fn build_one(
    runtime: &dyn RuntimeHandle,
    descriptor: Option<&DocumentDescriptor>,
    artboard: Option<&str>,
    name: &str,
    is_active: bool,
) -> Option<StateMachineControl> {
    let live_inputs = match runtime.state_machine_inputs(name) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!("state machine `{name}`: inputs unavailable: {err}");
            return None;
        }
    };
    if live_inputs.is_empty() {
        debug!("state machine `{name}` exposes no inputs; omitted");
        return None;
    }

    let parsed: Option<&StateMachineDescriptor> =
        artboard.and_then(|a| descriptor.and_then(|d| d.state_machine(a, name)));
    if parsed.is_none() {
        debug!("state machine `{name}` not found in descriptor; inputs carry no parsed info");
    }

    let inputs = live_inputs
        .into_iter()
        .map(|live_input| {
            let input_name = live_input.name();
            InputControl {
                kind: live_input.kind(),
                parsed_info: parsed.and_then(|sm| sm.input(&input_name)).cloned(),
                name: input_name,
                live_input,
            }
        })
        .collect();

    Some(StateMachineControl {
        name: name.to_string(),
        is_active,
        inputs,
    })
}
