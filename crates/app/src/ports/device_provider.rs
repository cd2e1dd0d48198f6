//! Device provider port — read access to the device snapshot store.

use std::future::Future;

use routerhub_domain::device::{DeviceView, ListFilter};
use routerhub_domain::error::HubError;

/// Read-only view of known devices, maintained by the presence pipeline
/// outside this core.
pub trait DeviceProvider {
    /// Get a device snapshot by its normalized identifier (MAC).
    fn get_device(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Option<DeviceView>, HubError>> + Send;

    /// List known devices matching the filter.
    fn list_devices(
        &self,
        filter: ListFilter,
    ) -> impl Future<Output = Result<Vec<DeviceView>, HubError>> + Send;
}
