//! Common error types used across the workspace.

use crate::capability::CapabilityScope;

/// Top-level error for the routerhub core.
///
/// The taxonomy follows how callers are expected to react:
/// invalid input is rejected before any side effect, not-found maps to a
/// 404-equivalent at the (external) HTTP layer, and precondition failures
/// ask the caller to fix the target or the add-on configuration first.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Capability payload or target reference failed validation.
    #[error("invalid capability: {0}")]
    CapabilityInvalid(String),

    /// Requested state is not declared by the capability template.
    #[error("invalid capability state: {0}")]
    CapabilityStateInvalid(String),

    /// Capability template is missing.
    #[error("capability {0:?} not found")]
    CapabilityNotFound(String),

    /// Capability template ID already exists.
    #[error("capability {0:?} already exists")]
    CapabilityConflict(String),

    /// Template scope and target scope disagree.
    #[error("capability scope mismatch: template is {template}, target is {target}")]
    CapabilityScopeMismatch {
        template: CapabilityScope,
        target: CapabilityScope,
    },

    /// Target device is unknown to the device provider.
    #[error("device {0:?} not found")]
    DeviceNotFound(String),

    /// Router credentials are missing in the add-on options.
    #[error("router is not configured in add-on options")]
    AddonNotConfigured,

    /// Repository collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Aggregate of per-target sync failures. One target's failure never
    /// stops reconciliation of the rest; everything collected ends up here.
    #[error("capability sync failed: {}", .0.join("; "))]
    SyncFailed(Vec<String>),
}
