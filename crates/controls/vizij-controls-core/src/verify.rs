//! Binding probe: mutate one scalar property, read it back, restore it.
//!
//! The probe is the only place the connector writes to live state. The
//! original value is written back on every path once the probe value has been
//! attempted, including failed writes and failed read-backs.

use log::{debug, error, warn};
use thiserror::Error;

use crate::config::ConnectorConfig;
use crate::dispatch;
use crate::error::AccessError;
use crate::kind::PropertyKind;
use crate::runtime::{PropertyInfo, ViewModelInstance};
use crate::value::Value;

/// Successful probe details.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeReport {
    pub property: String,
    pub kind: PropertyKind,
    pub original: Value,
    pub probe: Value,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProbeFailure {
    #[error("property list unavailable: {0}")]
    Properties(AccessError),
    #[error("no boolean, number or string property to probe")]
    NoEligibleProperty,
    #[error("runtime returned no handle for `{0}`")]
    Unbound(String),
    #[error("`{property}` holds {value:?}, which cannot be probed")]
    Unprobeable { property: String, value: Value },
    #[error("probe access to `{property}` failed: {source}")]
    Accessor {
        property: String,
        #[source]
        source: AccessError,
    },
    #[error("`{property}` did not round-trip: wrote {written:?}, read back {observed:?}")]
    RoundTrip {
        property: String,
        written: Value,
        observed: Value,
    },
    #[error("failed to restore `{property}`: {source}")]
    Restore {
        property: String,
        #[source]
        source: AccessError,
    },
}

/// Pick the property to probe: `preferred` when it names an eligible entry,
/// otherwise the first boolean/number/string.
pub fn select_probe_property<'a>(
    properties: &'a [PropertyInfo],
    preferred: Option<&str>,
) -> Option<&'a PropertyInfo> {
    if let Some(name) = preferred {
        if let Some(p) = properties
            .iter()
            .find(|p| p.name == name && p.kind.is_probeable())
        {
            return Some(p);
        }
    }
    properties.iter().find(|p| p.kind.is_probeable())
}

/// Probe value for `value`: negated bool, number plus delta, string plus
/// suffix. Other values cannot be probed, and neither can non-finite numbers.
///
/// A zero or non-finite delta is replaced by 1.0. The step is widened when
/// needed so it survives a runtime that stores numbers as f32.
pub fn perturb(value: &Value, config: &ConnectorConfig) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(!b)),
        Value::Number(n) if n.is_finite() => {
            let probe = n + number_step(*n, config.number_probe_delta);
            probe.is_finite().then_some(Value::Number(probe))
        }
        Value::Text(s) => Some(Value::Text(format!("{s}{}", config.string_probe_suffix))),
        _ => None,
    }
}

fn number_step(n: f64, delta: f64) -> f64 {
    let delta = if delta.is_finite() && delta != 0.0 {
        delta
    } else {
        warn!("verify: unusable number_probe_delta {delta}; probing with 1.0");
        1.0
    };
    let f32_floor = n.abs() * f64::from(f32::EPSILON) * 4.0;
    delta.signum() * delta.abs().max(f32_floor)
}

/// `true` when `observed` is the probe value and not the original. Numbers
/// match within half the probe step, which also absorbs f32 storage.
fn round_tripped(original: &Value, probe: &Value, observed: &Value) -> bool {
    match (original, probe, observed) {
        (Value::Number(from), Value::Number(to), Value::Number(seen)) => {
            (seen - to).abs() < (to - from).abs() / 2.0
        }
        _ => observed == probe && observed != original,
    }
}

/// Run the mutate/verify/restore cycle on one property of `instance`.
pub fn probe_binding(
    instance: &dyn ViewModelInstance,
    preferred: Option<&str>,
    config: &ConnectorConfig,
) -> Result<ProbeReport, ProbeFailure> {
    let properties = instance.properties().map_err(ProbeFailure::Properties)?;
    let target =
        select_probe_property(&properties, preferred).ok_or(ProbeFailure::NoEligibleProperty)?;
    let name = target.name.clone();
    let accessor_failure = |source: AccessError| ProbeFailure::Accessor {
        property: name.clone(),
        source,
    };

    let handle = dispatch::access(instance, &target.kind, &name)
        .map_err(accessor_failure)?
        .ok_or_else(|| ProbeFailure::Unbound(name.clone()))?;

    let original = handle.value().map_err(accessor_failure)?;
    let probe = perturb(&original, config).ok_or_else(|| ProbeFailure::Unprobeable {
        property: name.clone(),
        value: original.clone(),
    })?;

    let observed = handle
        .set_value(probe.clone())
        .and_then(|()| handle.value());
    let restored = handle.set_value(original.clone());

    if let Err(source) = restored {
        return Err(ProbeFailure::Restore {
            property: name,
            source,
        });
    }
    let observed = observed.map_err(accessor_failure)?;
    if !round_tripped(&original, &probe, &observed) {
        return Err(ProbeFailure::RoundTrip {
            property: name,
            written: probe,
            observed,
        });
    }

    Ok(ProbeReport {
        property: name,
        kind: target.kind.clone(),
        original,
        probe,
    })
}

/// `true` when the binding pipe of `instance` round-trips a write.
/// Failures are logged; they never abort the caller.
pub fn verify_binding(
    instance: &dyn ViewModelInstance,
    preferred: Option<&str>,
    config: &ConnectorConfig,
) -> bool {
    match probe_binding(instance, preferred, config) {
        Ok(report) => {
            debug!(
                "verify: `{}` ({}) round-tripped {:?} and was restored to {:?}",
                report.property, report.kind, report.probe, report.original
            );
            true
        }
        Err(failure @ ProbeFailure::Restore { .. }) => {
            error!("verify: {failure}; the document may be left modified");
            false
        }
        Err(failure) => {
            warn!("verify: binding check failed: {failure}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(list: &[(&str, PropertyKind)]) -> Vec<PropertyInfo> {
        list.iter()
            .map(|(n, k)| PropertyInfo::new(*n, k.clone()))
            .collect()
    }

    #[test]
    fn selection_prefers_named_scalar() {
        let list = props(&[
            ("child", PropertyKind::ViewModel),
            ("tint", PropertyKind::Color),
            ("count", PropertyKind::Number),
            ("label", PropertyKind::String),
        ]);
        assert_eq!(select_probe_property(&list, None).unwrap().name, "count");
        assert_eq!(
            select_probe_property(&list, Some("label")).unwrap().name,
            "label"
        );
        // A preferred name that is not probeable falls back to the first scalar.
        assert_eq!(
            select_probe_property(&list, Some("tint")).unwrap().name,
            "count"
        );
    }

    #[test]
    fn selection_fails_without_scalars() {
        let list = props(&[("child", PropertyKind::ViewModel)]);
        assert!(select_probe_property(&list, None).is_none());
    }

    #[test]
    fn perturbation_per_value_kind() {
        let cfg = ConnectorConfig::default();
        assert_eq!(perturb(&Value::Bool(false), &cfg), Some(Value::Bool(true)));
        assert_eq!(
            perturb(&Value::Number(2.0), &cfg),
            Some(Value::Number(3.0))
        );
        assert_eq!(
            perturb(&Value::Text("hi".into()), &cfg),
            Some(Value::Text("hi_vizij_probe".into()))
        );
        assert_eq!(perturb(&Value::Color(0), &cfg), None);
        assert_eq!(perturb(&Value::Number(f64::NAN), &cfg), None);
    }

    #[test]
    fn unusable_deltas_fall_back_to_one() {
        for delta in [0.0, f64::NAN, f64::INFINITY] {
            let cfg = ConnectorConfig {
                number_probe_delta: delta,
                ..ConnectorConfig::default()
            };
            assert_eq!(perturb(&Value::Number(2.0), &cfg), Some(Value::Number(3.0)));
        }
    }

    #[test]
    fn large_numbers_get_a_step_f32_can_hold() {
        let cfg = ConnectorConfig::default();
        let Some(Value::Number(probe)) = perturb(&Value::Number(1.0e9), &cfg) else {
            panic!("number probe expected");
        };
        assert_ne!(probe as f32, 1.0e9_f32);
    }

    #[test]
    fn round_trip_needs_the_probe_value() {
        let num = |n: f64| Value::Number(n);
        assert!(round_tripped(&num(1.1), &num(2.1), &num(2.1f32 as f64)));
        assert!(!round_tripped(&num(250_000.0), &num(250_001.0), &num(250_000.0)));
        assert!(!round_tripped(&num(0.0), &num(1.0), &num(0.5)));
        assert!(round_tripped(&Value::Bool(false), &Value::Bool(true), &Value::Bool(true)));
        assert!(!round_tripped(
            &Value::Text("a".into()),
            &Value::Text("a".into()),
            &Value::Text("a".into())
        ));
    }
}
