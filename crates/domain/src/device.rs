//! Device — the read model exposed by the device provider collaborator.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Snapshot of one known network device, keyed by MAC.
///
/// The presence pipeline that computes `online` and `last_ip` lives outside
/// this core; the automation layer only consumes the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceView {
    pub mac: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<Timestamp>,
}

/// Device list query constraints.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub online: Option<bool>,
    pub query: Option<String>,
}

/// Canonicalize a device identifier (MAC address).
///
/// Upper-cases, trims, decodes URL-encoded colons, and converts dashed
/// notation to colons so that `aa-bb-cc-dd-ee-ff` and `AA%3ABB%3A…` key the
/// same persisted record.
#[must_use]
pub fn normalize_device_id(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .replace("%3A", ":")
        .replace('-', ":")
}
