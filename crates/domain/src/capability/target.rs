//! Targets and persisted capability state records.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityScope;
use crate::device::DeviceView;
use crate::time::Timestamp;

/// Identifies *where* persisted capability state lives.
///
/// `device_id` is empty when `scope` is global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTargetRef {
    pub scope: CapabilityScope,
    #[serde(default)]
    pub device_id: String,
}

impl CapabilityTargetRef {
    /// Target for the global singleton.
    #[must_use]
    pub fn global() -> Self {
        Self {
            scope: CapabilityScope::Global,
            device_id: String::new(),
        }
    }

    /// Target for one device.
    #[must_use]
    pub fn device(device_id: impl Into<String>) -> Self {
        Self {
            scope: CapabilityScope::Device,
            device_id: device_id.into(),
        }
    }
}

/// What actions and state sources operate against at execution time.
///
/// Carries the live device snapshot (MAC, last IP) needed to resolve
/// action parameters; `device` is `None` under global scope.
#[derive(Debug, Clone, Default)]
pub struct AutomationTarget {
    pub scope: CapabilityScope,
    pub device: Option<DeviceView>,
}

impl AutomationTarget {
    /// Target for the global singleton.
    #[must_use]
    pub fn global() -> Self {
        Self {
            scope: CapabilityScope::Global,
            device: None,
        }
    }

    /// Target carrying a resolved device snapshot.
    #[must_use]
    pub fn device(device: DeviceView) -> Self {
        Self {
            scope: CapabilityScope::Device,
            device: Some(device),
        }
    }
}

/// Per-device persisted capability state, keyed by `(device_id, capability_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapability {
    pub device_id: String,
    pub capability_id: String,
    pub enabled: bool,
    pub state: String,
    pub updated_at: Timestamp,
}

/// Global singleton capability state, keyed by `capability_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapability {
    pub capability_id: String,
    pub enabled: bool,
    pub state: String,
}

/// Non-fatal per-action failure detail. Never aborts a transition; the
/// caller inspects the list to know whether side effects actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionExecutionWarning {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action_id: String,
    pub type_id: String,
    pub message: String,
}

/// State transition outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStateResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ActionExecutionWarning>,
}

impl SetStateResult {
    /// A successful result with no warnings.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            ok: true,
            warnings: Vec::new(),
        }
    }
}
