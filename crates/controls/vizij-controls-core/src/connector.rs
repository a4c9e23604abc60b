//! Public entry point: descriptor + runtime -> control tree.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::builder::TreeBuilder;
use crate::config::ConnectorConfig;
use crate::control::{ControlNode, ControlTree};
use crate::descriptor::DocumentDescriptor;
use crate::placeholder::build_placeholder;
use crate::resolve::resolve_root;
use crate::runtime::RuntimeHandle;
use crate::state_machine::build_state_machine_controls;

/// What the host currently has selected. Empty fields are filled from the
/// runtime, then from the descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSelection {
    #[serde(default)]
    pub artboard: Option<String>,
    #[serde(default)]
    pub state_machines: Vec<String>,
}

impl ActiveSelection {
    pub fn artboard(name: impl Into<String>) -> Self {
        Self {
            artboard: Some(name.into()),
            state_machines: Vec::new(),
        }
    }

    pub fn with_state_machine(mut self, name: impl Into<String>) -> Self {
        self.state_machines.push(name.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Connector {
    config: ConnectorConfig,
}

impl Connector {
    pub fn new(config: ConnectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Build one control tree snapshot. Never fails: missing inputs and runtime
    /// failures degrade the output instead.
    pub fn connect(
        &self,
        descriptor: Option<&DocumentDescriptor>,
        runtime: Option<&dyn RuntimeHandle>,
        selection: &ActiveSelection,
    ) -> ControlTree {
        if descriptor.is_none() && runtime.is_none() {
            error!("connect: neither a document descriptor nor a runtime handle was supplied");
            return ControlTree::default();
        }

        let artboard = selection
            .artboard
            .clone()
            .or_else(|| runtime.and_then(|rt| rt.artboard_name()))
            .or_else(|| descriptor.and_then(|d| d.first_artboard_name().map(str::to_string)));
        let state_machines = if selection.state_machines.is_empty() {
            runtime
                .map(|rt| rt.playing_state_machine_names())
                .unwrap_or_default()
        } else {
            selection.state_machines.clone()
        };

        let state_machine_controls = runtime
            .map(|rt| {
                build_state_machine_controls(
                    rt,
                    descriptor,
                    artboard.as_deref(),
                    &state_machines,
                    &self.config,
                )
            })
            .unwrap_or_default();

        let root = match runtime {
            Some(rt) => self.build_live_root(rt, descriptor, artboard.as_deref()),
            None => None,
        };
        let root = root.or_else(|| {
            if runtime.is_some() {
                warn!("connect: no live root instance; falling back to descriptor placeholder");
            }
            let (doc, board) = (descriptor?, artboard.as_deref()?);
            build_placeholder(doc, board)
        });

        let tree = ControlTree {
            active_view_model_name: root.as_ref().map(|n| n.blueprint_name.clone()),
            active_artboard_name: artboard,
            active_state_machine_names: state_machines,
            state_machine_controls,
            view_model_controls: root.into_iter().collect(),
        };
        info!(
            "connect: artboard {:?}, {} state machine group(s), {} view-model node(s){}",
            tree.active_artboard_name,
            tree.state_machine_controls.len(),
            tree.view_model_controls
                .iter()
                .map(ControlNode::node_count)
                .sum::<usize>(),
            if tree.root().is_some_and(ControlNode::is_placeholder) {
                " (placeholder)"
            } else {
                ""
            }
        );
        tree
    }

    fn build_live_root(
        &self,
        runtime: &dyn RuntimeHandle,
        descriptor: Option<&DocumentDescriptor>,
        artboard: Option<&str>,
    ) -> Option<ControlNode> {
        let resolution = resolve_root(runtime, artboard)?;
        let declared = artboard
            .and_then(|a| descriptor.and_then(|d| d.artboard(a)))
            .and_then(|board| board.first_view_model());

        let blueprint_name = resolution
            .instance
            .name()
            .filter(|name| !name.is_empty())
            .or_else(|| declared.map(|bp| bp.blueprint_name.clone()))
            .or_else(|| artboard.map(str::to_string))
            .unwrap_or_else(|| "root".to_string());

        let mut builder = TreeBuilder::new(descriptor, &self.config);
        let instance_name = builder
            .catalog()
            .blueprint(&blueprint_name)
            .map(|bp| bp.display_name().to_string())
            .unwrap_or_else(|| blueprint_name.clone());

        let node = builder.build_node(resolution.instance, &instance_name, &blueprint_name);
        let (probed, failed) = builder.verification_counts();
        if failed > 0 {
            warn!(
                "connect: {failed} of {probed} binding check(s) failed; \
                 controls may not write through"
            );
        }
        Some(node)
    }
}

/// Connect with the default configuration.
pub fn connect(
    descriptor: Option<&DocumentDescriptor>,
    runtime: Option<&dyn RuntimeHandle>,
    selection: &ActiveSelection,
) -> ControlTree {
    Connector::default().connect(descriptor, runtime, selection)
}
