//! Root resolution: find the view-model instance bound to the active artboard.
//!
//! Strategies run in [`ROOT_STRATEGIES`] order and the first one that yields
//! an instance wins. Each attempt is isolated: a failure or an empty result
//! only moves on to the next strategy.

use log::{debug, info, trace, warn};

use crate::runtime::{Access, DefinitionRef, InstanceRef, RuntimeHandle};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RootStrategy {
    /// The runtime's currently bound instance.
    BoundInstance,
    /// A field on the runtime handle named after the active artboard.
    ArtboardField,
    /// The artboard's default view model, via its default-instance factory.
    ArtboardDefault,
    /// The document's default view model: default instance, else the first
    /// enumerated instance.
    DefaultViewModel,
}

pub const ROOT_STRATEGIES: [RootStrategy; 4] = [
    RootStrategy::BoundInstance,
    RootStrategy::ArtboardField,
    RootStrategy::ArtboardDefault,
    RootStrategy::DefaultViewModel,
];

impl RootStrategy {
    pub fn label(self) -> &'static str {
        match self {
            RootStrategy::BoundInstance => "bound instance",
            RootStrategy::ArtboardField => "artboard field",
            RootStrategy::ArtboardDefault => "artboard default view model",
            RootStrategy::DefaultViewModel => "document default view model",
        }
    }

    /// Run this strategy once.
    pub fn attempt(
        self,
        runtime: &dyn RuntimeHandle,
        artboard: Option<&str>,
    ) -> Access<InstanceRef> {
        match self {
            RootStrategy::BoundInstance => runtime.bound_instance(),
            RootStrategy::ArtboardField => match artboard {
                Some(name) => runtime.field_instance(name),
                None => Ok(None),
            },
            RootStrategy::ArtboardDefault => match artboard {
                Some(name) => match runtime.artboard_default_view_model(name)? {
                    Some(definition) => definition.default_instance(),
                    None => Ok(None),
                },
                None => Ok(None),
            },
            RootStrategy::DefaultViewModel => match runtime.default_view_model()? {
                Some(definition) => default_or_first_instance(&definition),
                None => Ok(None),
            },
        }
    }
}

fn default_or_first_instance(definition: &DefinitionRef) -> Access<InstanceRef> {
    match definition.default_instance() {
        Ok(Some(instance)) => return Ok(Some(instance)),
        Ok(None) => trace!("resolve: default view model has no default instance"),
        Err(err) => debug!("resolve: default instance factory failed: {err}"),
    }
    if definition.instance_count()? == 0 {
        return Ok(None);
    }
    definition.instance_at(0)
}

/// The resolved root and the strategy that produced it.
#[derive(Clone, Debug)]
pub struct RootResolution {
    pub instance: InstanceRef,
    pub strategy: RootStrategy,
}

/// Resolve the root instance with the default strategy order. `None` means no
/// live binding is available; it is not an error.
pub fn resolve_root(
    runtime: &dyn RuntimeHandle,
    artboard: Option<&str>,
) -> Option<RootResolution> {
    resolve_root_with(runtime, artboard, &ROOT_STRATEGIES)
}

/// Resolve the root instance trying `strategies` in order.
pub fn resolve_root_with(
    runtime: &dyn RuntimeHandle,
    artboard: Option<&str>,
    strategies: &[RootStrategy],
) -> Option<RootResolution> {
    for &strategy in strategies {
        match strategy.attempt(runtime, artboard) {
            Ok(Some(instance)) => {
                info!(
                    "resolve: root instance for artboard {:?} found via {}",
                    artboard,
                    strategy.label()
                );
                return Some(RootResolution { instance, strategy });
            }
            Ok(None) => trace!("resolve: {} yielded nothing", strategy.label()),
            Err(err) if err.is_unsupported() => {
                trace!("resolve: {} unavailable: {err}", strategy.label())
            }
            Err(err) => warn!("resolve: {} failed: {err}", strategy.label()),
        }
    }
    warn!("resolve: no root view-model instance for artboard {artboard:?}");
    None
}
