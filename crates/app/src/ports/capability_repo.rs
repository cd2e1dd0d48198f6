//! Capability repository port — persistence for templates and applied state.

use std::collections::HashMap;
use std::future::Future;

use routerhub_domain::capability::{CapabilityTemplate, DeviceCapability, GlobalCapability};
use routerhub_domain::error::HubError;

/// Repository for capability templates and persisted capability state.
///
/// Persisted state records are created lazily by the engine on first
/// transition and never deleted here; their lifecycle is tied to device
/// and template deletion, handled by collaborators.
pub trait CapabilityRepository {
    /// List templates, optionally filtered by a search string and category.
    fn list_templates(
        &self,
        search: &str,
        category: &str,
    ) -> impl Future<Output = Result<Vec<CapabilityTemplate>, HubError>> + Send;

    /// Get a template by its dotted identifier.
    fn get_template(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<CapabilityTemplate>, HubError>> + Send;

    /// Insert a new template.
    ///
    /// Fails with [`HubError::CapabilityConflict`] when the ID already exists.
    fn create_template(
        &self,
        template: CapabilityTemplate,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Update an existing template.
    ///
    /// Fails with [`HubError::CapabilityNotFound`] when the ID is missing.
    fn update_template(
        &self,
        template: CapabilityTemplate,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Delete a template by ID.
    ///
    /// Fails with [`HubError::CapabilityNotFound`] when the ID is missing.
    fn delete_template(&self, id: &str) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Insert or replace one device's capability state record.
    fn upsert_device_capability(
        &self,
        state: DeviceCapability,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Get one device's state record for a capability, if any.
    fn get_device_capability(
        &self,
        device_id: &str,
        capability_id: &str,
    ) -> impl Future<Output = Result<Option<DeviceCapability>, HubError>> + Send;

    /// All capability state records for one device, keyed by capability ID.
    fn list_device_capabilities(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<HashMap<String, DeviceCapability>, HubError>> + Send;

    /// All device state records for one capability, keyed by device ID.
    fn list_capability_devices(
        &self,
        capability_id: &str,
    ) -> impl Future<Output = Result<HashMap<String, DeviceCapability>, HubError>> + Send;

    /// Get the global singleton record for a capability, if any.
    fn get_global_capability(
        &self,
        capability_id: &str,
    ) -> impl Future<Output = Result<Option<GlobalCapability>, HubError>> + Send;

    /// Insert or replace the global singleton record for a capability.
    fn save_global_capability(
        &self,
        capability: GlobalCapability,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// All global capability records.
    fn list_global_capabilities(
        &self,
    ) -> impl Future<Output = Result<Vec<GlobalCapability>, HubError>> + Send;
}
