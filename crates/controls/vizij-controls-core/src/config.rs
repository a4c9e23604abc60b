//! Connector configuration.

use serde::{Deserialize, Serialize};

/// Knobs for a connector build. Every field has a default, so hosts can pass a
/// partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Run the binding probe before trusting a resolved root instance.
    pub verify_bindings: bool,
    /// Also probe every nested instance before collecting its properties.
    pub verify_nested_instances: bool,
    /// Property the probe should prefer when it is a boolean/number/string.
    pub probe_property: Option<String>,
    /// Amount added to a number property while probing.
    pub number_probe_delta: f64,
    /// Suffix appended to a string property while probing.
    pub string_probe_suffix: String,
    /// Nested view models deeper than this are truncated.
    pub max_nesting_depth: usize,
    /// Also offer descriptor state machines that are not currently active.
    pub include_inactive_state_machines: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            verify_bindings: true,
            verify_nested_instances: true,
            probe_property: None,
            number_probe_delta: 1.0,
            string_probe_suffix: "_vizij_probe".to_string(),
            max_nesting_depth: 32,
            include_inactive_state_machines: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ConnectorConfig =
            serde_json::from_str(r#"{ "verify_bindings": false, "max_nesting_depth": 4 }"#)
                .expect("parse config");
        assert!(!cfg.verify_bindings);
        assert_eq!(cfg.max_nesting_depth, 4);
        assert_eq!(cfg.string_probe_suffix, "_vizij_probe");
        assert!(cfg.verify_nested_instances);
    }
}
