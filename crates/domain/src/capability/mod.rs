//! Capability — a named, templated unit of controllable behavior.
//!
//! A capability template binds a small state machine (a binary switch or a
//! multi-value select) to ordered lists of side-effecting actions, and
//! optionally to an external state source that keeps the persisted state
//! reconciled with ground truth read back from the router.

mod params;
mod target;
mod view;

pub use params::{ParamField, ParamKind, Params, VisibleIf, contains_device_placeholder, string_param};
pub use target::{
    ActionExecutionWarning, AutomationTarget, CapabilityTargetRef, DeviceCapability,
    GlobalCapability, SetStateResult,
};
pub use view::{CapabilityAssignment, CapabilityUiModel};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a capability's persisted state lives: one record per device, or a
/// single shared record for the whole system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityScope {
    #[default]
    Device,
    Global,
}

impl std::fmt::Display for CapabilityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Global => f.write_str("global"),
        }
    }
}

/// Frontend control rendered for capability state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    /// Binary on/off switch.
    Switch,
    /// Multi-state selector.
    Select,
}

/// One selectable state option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityControlOption {
    pub value: String,
    pub label: String,
}

/// Control model: type plus the ordered list of selectable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityControl {
    #[serde(rename = "type")]
    pub control_type: ControlType,
    #[serde(default)]
    pub options: Vec<CapabilityControlOption>,
}

/// One configured action invocation inside a state's enter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInstance {
    /// Instance label chosen by the template author.
    #[serde(default)]
    pub id: String,
    /// Registry key of the action type.
    pub type_id: String,
    /// Untyped parameters; each action interprets its own keys.
    #[serde(default)]
    pub params: Params,
}

/// A logical state and the actions executed when entering it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityStateConfig {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub actions_on_enter: Vec<ActionInstance>,
}

/// External truth source for sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySyncSource {
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub params: Params,
}

/// Maps the source's boolean output to internal state names.
///
/// Empty mapping entries disable the corresponding direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySyncMapping {
    #[serde(default)]
    pub when_true: String,
    #[serde(default)]
    pub when_false: String,
}

/// Which side wins when persisted state and external truth disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// The router is authoritative; drift is pushed into persisted state.
    #[default]
    ExternalTruth,
    /// Local state is authoritative; sync never overwrites it.
    InternalTruth,
}

/// Periodic reconciliation settings for one capability template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySyncConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub source: CapabilitySyncSource,
    #[serde(default)]
    pub mapping: CapabilitySyncMapping,
    #[serde(default)]
    pub mode: SyncMode,
    /// When true, sync-detected drift re-enters the normal transition path
    /// so the capability's own actions still fire. When false, the detected
    /// state is written directly (a silent state correction).
    #[serde(default)]
    pub trigger_actions_on_sync: bool,
}

/// Home Assistant entity export settings. Opaque to the engine; validated
/// structurally on template writes and passed through to the export layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaExposeConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub entity_suffix: String,
    #[serde(default)]
    pub name_template: String,
}

/// Declarative capability definition.
///
/// Invariants (enforced by the app layer's template validation): every
/// control option value and `default_state` must exist as a key in
/// `states`; a switch control declares exactly the two values `on`/`off`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityTemplate {
    /// Dotted identifier, e.g. `routing.vpn`.
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub scope: CapabilityScope,
    pub control: CapabilityControl,
    /// State name → state configuration. Ordered for stable listings.
    #[serde(default)]
    pub states: BTreeMap<String, CapabilityStateConfig>,
    pub default_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<CapabilitySyncConfig>,
    #[serde(default)]
    pub ha_expose: HaExposeConfig,
}

impl CapabilityTemplate {
    /// Whether the template declares the given state name.
    #[must_use]
    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    /// Whether sync is configured and switched on.
    #[must_use]
    pub fn sync_enabled(&self) -> bool {
        self.sync.as_ref().is_some_and(|sync| sync.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch_template() -> CapabilityTemplate {
        CapabilityTemplate {
            id: "routing.vpn".to_string(),
            label: "Route via VPN".to_string(),
            description: String::new(),
            category: "routing".to_string(),
            scope: CapabilityScope::Device,
            control: CapabilityControl {
                control_type: ControlType::Switch,
                options: vec![
                    CapabilityControlOption {
                        value: "on".to_string(),
                        label: "On".to_string(),
                    },
                    CapabilityControlOption {
                        value: "off".to_string(),
                        label: "Off".to_string(),
                    },
                ],
            },
            states: [
                ("on".to_string(), CapabilityStateConfig::default()),
                ("off".to_string(), CapabilityStateConfig::default()),
            ]
            .into_iter()
            .collect(),
            default_state: "off".to_string(),
            sync: None,
            ha_expose: HaExposeConfig::default(),
        }
    }

    #[test]
    fn should_default_scope_to_device() {
        assert_eq!(CapabilityScope::default(), CapabilityScope::Device);
    }

    #[test]
    fn should_report_declared_states() {
        let template = switch_template();
        assert!(template.has_state("on"));
        assert!(template.has_state("off"));
        assert!(!template.has_state("maybe"));
    }

    #[test]
    fn should_report_sync_disabled_when_absent() {
        let template = switch_template();
        assert!(!template.sync_enabled());
    }

    #[test]
    fn should_report_sync_enabled_when_configured() {
        let mut template = switch_template();
        template.sync = Some(CapabilitySyncConfig {
            enabled: true,
            ..CapabilitySyncConfig::default()
        });
        assert!(template.sync_enabled());
    }

    #[test]
    fn should_roundtrip_template_through_serde_json() {
        let template = switch_template();
        let json = serde_json::to_string(&template).unwrap();
        let parsed: CapabilityTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, template);
    }

    #[test]
    fn should_deserialize_scope_from_lowercase() {
        let scope: CapabilityScope = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(scope, CapabilityScope::Global);
    }

    #[test]
    fn should_default_sync_mode_to_external_truth() {
        let json = serde_json::json!({"enabled": true});
        let sync: CapabilitySyncConfig = serde_json::from_value(json).unwrap();
        assert_eq!(sync.mode, SyncMode::ExternalTruth);
    }

    #[test]
    fn should_deserialize_internal_truth_mode() {
        let json = serde_json::json!({"enabled": true, "mode": "internal_truth"});
        let sync: CapabilitySyncConfig = serde_json::from_value(json).unwrap();
        assert_eq!(sync.mode, SyncMode::InternalTruth);
    }

    #[test]
    fn should_serialize_control_type_under_type_key() {
        let control = CapabilityControl {
            control_type: ControlType::Switch,
            options: Vec::new(),
        };
        let json = serde_json::to_value(&control).unwrap();
        assert_eq!(json["type"], "switch");
    }
}
