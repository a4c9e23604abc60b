//! Recursive walk over a live view-model instance graph.
//!
//! Scalar properties are collected first, nested view models second. Each
//! property and each nested fetch is its own failure unit: a failing unit is
//! logged and skipped, its siblings still get built.
//!
//! The builder keeps the chain of (blueprint, instance) pairs currently being
//! expanded. Reaching an instance already on the chain, a known blueprint
//! already on the chain, or the configured depth limit stops expansion at that
//! node and marks it `truncated`. Blueprint names that only fall back to the
//! property name are not known and never count as a revisit.

use log::{debug, trace, warn};

use crate::config::ConnectorConfig;
use crate::control::{ControlNode, LivePropertyControl, NodeBinding};
use crate::descriptor::DocumentDescriptor;
use crate::dispatch::read_live_property;
use crate::kind::PropertyKind;
use crate::metadata::{BlueprintCatalog, NestedLookup};
use crate::runtime::{handle_addr, InstanceRef, PropertyInfo};
use crate::verify::verify_binding;

struct ChainEntry {
    blueprint: Option<String>,
    instance: *const (),
}

pub struct TreeBuilder<'a> {
    catalog: BlueprintCatalog<'a>,
    config: &'a ConnectorConfig,
    chain: Vec<ChainEntry>,
    verified: usize,
    verification_failures: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(descriptor: Option<&'a DocumentDescriptor>, config: &'a ConnectorConfig) -> Self {
        Self {
            catalog: BlueprintCatalog::new(descriptor),
            config,
            chain: Vec::new(),
            verified: 0,
            verification_failures: 0,
        }
    }

    pub fn catalog(&self) -> &BlueprintCatalog<'a> {
        &self.catalog
    }

    /// Number of binding probes run so far, and how many of them failed.
    pub fn verification_counts(&self) -> (usize, usize) {
        (self.verified, self.verification_failures)
    }

    /// Build the node for `instance` and everything nested below it.
    pub fn build_node(
        &mut self,
        instance: InstanceRef,
        instance_name: &str,
        blueprint_name: &str,
    ) -> ControlNode {
        self.expand(instance, instance_name, blueprint_name, true)
    }

    fn expand(
        &mut self,
        instance: InstanceRef,
        instance_name: &str,
        blueprint_name: &str,
        blueprint_known: bool,
    ) -> ControlNode {
        let is_root = self.chain.is_empty();
        if self.config.verify_bindings && (is_root || self.config.verify_nested_instances) {
            self.verified += 1;
            if !verify_binding(
                instance.as_ref(),
                self.config.probe_property.as_deref(),
                self.config,
            ) {
                self.verification_failures += 1;
                warn!(
                    "builder: binding check failed for `{instance_name}` ({blueprint_name}); \
                     offering its controls anyway"
                );
            }
        }

        let declared = match instance.properties() {
            Ok(list) => list,
            Err(err) => {
                warn!("builder: property list of `{instance_name}` unavailable: {err}");
                Vec::new()
            }
        };

        let properties = self.collect_properties(&instance, &declared, blueprint_name);

        let addr = handle_addr(&instance);
        let revisit = self
            .chain
            .iter()
            .any(|entry| {
                entry.instance == addr
                    || (blueprint_known && entry.blueprint.as_deref() == Some(blueprint_name))
            });
        let too_deep = self.chain.len() >= self.config.max_nesting_depth;

        let mut node = ControlNode {
            instance_name: instance_name.to_string(),
            blueprint_name: blueprint_name.to_string(),
            binding: NodeBinding::Live {
                instance: instance.clone(),
                properties,
            },
            nested_view_models: Vec::new(),
            truncated: false,
        };

        if revisit || too_deep {
            warn!(
                "builder: not expanding `{}` ({}): {}",
                instance_name,
                blueprint_name,
                if revisit {
                    "already being expanded further up"
                } else {
                    "nesting depth limit reached"
                }
            );
            node.truncated = true;
            return node;
        }

        self.chain.push(ChainEntry {
            blueprint: blueprint_known.then(|| blueprint_name.to_string()),
            instance: addr,
        });
        for entry in declared
            .iter()
            .filter(|p| p.kind == PropertyKind::ViewModel)
        {
            let nested = match instance.view_model(&entry.name) {
                Ok(Some(nested)) => nested,
                Ok(None) => {
                    warn!(
                        "builder: nested view model `{}` of `{}` not available",
                        entry.name, instance_name
                    );
                    continue;
                }
                Err(err) => {
                    warn!(
                        "builder: fetching nested view model `{}` of `{}` failed: {err}",
                        entry.name, instance_name
                    );
                    continue;
                }
            };
            let known = self.catalog.known_nested_blueprint(&NestedLookup {
                parent_blueprint: Some(blueprint_name),
                property: &entry.name,
                instance: nested.as_ref(),
            });
            let child = match known {
                Some(bp) => self.expand(nested, &entry.name, &bp, true),
                None => {
                    debug!(
                        "builder: nested `{}` has no known blueprint; using the property name",
                        entry.name
                    );
                    self.expand(nested, &entry.name, &entry.name, false)
                }
            };
            node.nested_view_models.push(child);
        }
        self.chain.pop();

        node
    }

    fn collect_properties(
        &self,
        instance: &InstanceRef,
        declared: &[PropertyInfo],
        blueprint_name: &str,
    ) -> Vec<LivePropertyControl> {
        let mut out = Vec::with_capacity(declared.len());
        for entry in declared {
            if entry.kind == PropertyKind::ViewModel {
                continue;
            }
            if !entry.kind.is_dispatchable() {
                trace!(
                    "builder: skipping `{}` of unsupported kind {}",
                    entry.name,
                    entry.kind
                );
                continue;
            }
            let Some(live_property) = read_live_property(instance.as_ref(), entry) else {
                debug!("builder: `{}` has no live handle; skipped", entry.name);
                continue;
            };
            let enum_type_name = (entry.kind == PropertyKind::Enum)
                .then(|| self.catalog.enum_type_name(Some(blueprint_name), &entry.name));
            out.push(LivePropertyControl {
                name: entry.name.clone(),
                kind: entry.kind.clone(),
                live_property,
                enum_type_name,
            });
        }
        out
    }
}
