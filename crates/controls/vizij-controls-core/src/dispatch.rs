//! Property accessor dispatch: declared kind -> live accessor call.

use log::{debug, trace, warn};

use crate::kind::PropertyKind;
use crate::runtime::{Access, LivePropertyRef, PropertyInfo, ViewModelInstance};

/// Fetch the live handle for `property`, or `None` when the runtime cannot
/// provide one. Failures are logged and contained to this single property.
///
/// `viewModel` and unknown kinds are never dispatched.
pub fn read_live_property(
    instance: &dyn ViewModelInstance,
    property: &PropertyInfo,
) -> Option<LivePropertyRef> {
    if !property.kind.is_dispatchable() {
        trace!(
            "dispatch: `{}` has kind {}; not a bindable property",
            property.name,
            property.kind
        );
        return None;
    }

    match access(instance, &property.kind, &property.name) {
        Ok(Some(handle)) => Some(handle),
        Ok(None) => {
            debug!(
                "dispatch: runtime returned no {} handle for `{}`",
                property.kind, property.name
            );
            None
        }
        Err(err) if err.is_unsupported() => {
            debug!("dispatch: skipping `{}`: {}", property.name, err);
            None
        }
        Err(err) => {
            warn!(
                "dispatch: {} accessor for `{}` failed: {}",
                property.kind, property.name, err
            );
            None
        }
    }
}

/// Raw accessor selection without logging. Enum properties fall back to the
/// string accessor when the enum accessor is missing, fails, or returns nothing.
pub(crate) fn access(
    instance: &dyn ViewModelInstance,
    kind: &PropertyKind,
    name: &str,
) -> Access<LivePropertyRef> {
    match kind {
        PropertyKind::Boolean => instance.boolean(name),
        PropertyKind::Number => instance.number(name),
        PropertyKind::String => instance.string(name),
        PropertyKind::Color => instance.color(name),
        PropertyKind::Enum => match instance.enumeration(name) {
            Ok(Some(handle)) => Ok(Some(handle)),
            Ok(None) => {
                debug!("dispatch: enum `{name}` unavailable, reading it as a string");
                instance.string(name)
            }
            Err(err) => {
                debug!(
                    "dispatch: enum accessor for `{name}` failed ({err}), reading it as a string"
                );
                instance.string(name)
            }
        },
        PropertyKind::Trigger => instance.trigger(name),
        PropertyKind::ViewModel | PropertyKind::Other(_) => Ok(None),
    }
}
