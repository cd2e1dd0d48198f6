//! Read models consumed by the (external) HTTP layer.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityControl;

/// Capability read model for one device's controls UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityUiModel {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub control: CapabilityControl,
    pub state: String,
    pub enabled: bool,
}

/// Capability state bound to one device, for assignment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityAssignment {
    pub device_id: String,
    pub device_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_ip: String,
    pub online: bool,
    pub enabled: bool,
    pub state: String,
}
