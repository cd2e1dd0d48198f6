//! Shared in-memory fakes and fixtures for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use routerhub_domain::capability::{
    ActionInstance, AutomationTarget, CapabilityControl, CapabilityControlOption, CapabilityScope,
    CapabilityStateConfig, CapabilityTemplate, ControlType, DeviceCapability, GlobalCapability,
    HaExposeConfig, Params,
};
use routerhub_domain::device::{DeviceView, ListFilter};
use routerhub_domain::error::HubError;
use routerhub_domain::router::RouterConfig;

use crate::ports::automation::{Action, ActionExecutionContext, ActionMetadata};
use crate::ports::capability_repo::CapabilityRepository;
use crate::ports::device_provider::DeviceProvider;
use crate::ports::router::{RouterActionClient, RouterConfigProvider, RouterStateClient};

#[derive(Clone, Default)]
pub(crate) struct InMemoryRepository {
    templates: Arc<Mutex<HashMap<String, CapabilityTemplate>>>,
    device_capabilities: Arc<Mutex<HashMap<(String, String), DeviceCapability>>>,
    global_capabilities: Arc<Mutex<HashMap<String, GlobalCapability>>>,
}

impl InMemoryRepository {
    pub(crate) fn with_template(template: CapabilityTemplate) -> Self {
        let repo = Self::default();
        repo.templates
            .lock()
            .unwrap()
            .insert(template.id.clone(), template);
        repo
    }

    pub(crate) fn insert_template(&self, template: CapabilityTemplate) {
        self.templates
            .lock()
            .unwrap()
            .insert(template.id.clone(), template);
    }

    pub(crate) fn device_state(
        &self,
        device_id: &str,
        capability_id: &str,
    ) -> Option<DeviceCapability> {
        self.device_capabilities
            .lock()
            .unwrap()
            .get(&(device_id.to_string(), capability_id.to_string()))
            .cloned()
    }

    pub(crate) fn global_state(&self, capability_id: &str) -> Option<GlobalCapability> {
        self.global_capabilities
            .lock()
            .unwrap()
            .get(capability_id)
            .cloned()
    }
}

impl CapabilityRepository for InMemoryRepository {
    async fn list_templates(
        &self,
        _search: &str,
        _category: &str,
    ) -> Result<Vec<CapabilityTemplate>, HubError> {
        let mut templates: Vec<_> = self.templates.lock().unwrap().values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }

    async fn get_template(&self, id: &str) -> Result<Option<CapabilityTemplate>, HubError> {
        Ok(self.templates.lock().unwrap().get(id).cloned())
    }

    async fn create_template(&self, template: CapabilityTemplate) -> Result<(), HubError> {
        let mut templates = self.templates.lock().unwrap();
        if templates.contains_key(&template.id) {
            return Err(HubError::CapabilityConflict(template.id));
        }
        templates.insert(template.id.clone(), template);
        Ok(())
    }

    async fn update_template(&self, template: CapabilityTemplate) -> Result<(), HubError> {
        let mut templates = self.templates.lock().unwrap();
        if !templates.contains_key(&template.id) {
            return Err(HubError::CapabilityNotFound(template.id));
        }
        templates.insert(template.id.clone(), template);
        Ok(())
    }

    async fn delete_template(&self, id: &str) -> Result<(), HubError> {
        self.templates
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| HubError::CapabilityNotFound(id.to_string()))
    }

    async fn upsert_device_capability(&self, state: DeviceCapability) -> Result<(), HubError> {
        self.device_capabilities
            .lock()
            .unwrap()
            .insert((state.device_id.clone(), state.capability_id.clone()), state);
        Ok(())
    }

    async fn get_device_capability(
        &self,
        device_id: &str,
        capability_id: &str,
    ) -> Result<Option<DeviceCapability>, HubError> {
        Ok(self.device_state(device_id, capability_id))
    }

    async fn list_device_capabilities(
        &self,
        device_id: &str,
    ) -> Result<HashMap<String, DeviceCapability>, HubError> {
        Ok(self
            .device_capabilities
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.device_id == device_id)
            .map(|record| (record.capability_id.clone(), record.clone()))
            .collect())
    }

    async fn list_capability_devices(
        &self,
        capability_id: &str,
    ) -> Result<HashMap<String, DeviceCapability>, HubError> {
        Ok(self
            .device_capabilities
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.capability_id == capability_id)
            .map(|record| (record.device_id.clone(), record.clone()))
            .collect())
    }

    async fn get_global_capability(
        &self,
        capability_id: &str,
    ) -> Result<Option<GlobalCapability>, HubError> {
        Ok(self.global_state(capability_id))
    }

    async fn save_global_capability(&self, capability: GlobalCapability) -> Result<(), HubError> {
        self.global_capabilities
            .lock()
            .unwrap()
            .insert(capability.capability_id.clone(), capability);
        Ok(())
    }

    async fn list_global_capabilities(&self) -> Result<Vec<GlobalCapability>, HubError> {
        Ok(self
            .global_capabilities
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeDevices {
    devices: Arc<Mutex<HashMap<String, DeviceView>>>,
}

impl FakeDevices {
    pub(crate) fn with_device(device: DeviceView) -> Self {
        let provider = Self::default();
        provider.insert_device(device);
        provider
    }

    pub(crate) fn insert_device(&self, device: DeviceView) {
        self.devices
            .lock()
            .unwrap()
            .insert(device.mac.clone(), device);
    }
}

impl DeviceProvider for FakeDevices {
    async fn get_device(&self, device_id: &str) -> Result<Option<DeviceView>, HubError> {
        Ok(self.devices.lock().unwrap().get(device_id).cloned())
    }

    async fn list_devices(&self, _filter: ListFilter) -> Result<Vec<DeviceView>, HubError> {
        let mut devices: Vec<_> = self.devices.lock().unwrap().values().cloned().collect();
        devices.sort_by(|a, b| a.mac.cmp(&b.mac));
        Ok(devices)
    }
}

#[derive(Clone)]
pub(crate) struct FakeConfigProvider(pub(crate) Option<RouterConfig>);

impl RouterConfigProvider for FakeConfigProvider {
    fn get(&self) -> Option<RouterConfig> {
        self.0.clone()
    }
}

#[derive(Default)]
pub(crate) struct FakeRouter {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) address_list_state: Mutex<bool>,
}

#[async_trait]
impl RouterActionClient for FakeRouter {
    async fn add_address_list_entry(
        &self,
        _config: &RouterConfig,
        list: &str,
        address: &str,
    ) -> Result<(), HubError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("add {list} {address}"));
        Ok(())
    }

    async fn remove_address_list_entry(
        &self,
        _config: &RouterConfig,
        list: &str,
        address: &str,
    ) -> Result<(), HubError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("remove {list} {address}"));
        Ok(())
    }

    async fn set_firewall_rule_disabled(
        &self,
        _config: &RouterConfig,
        table: &str,
        rule_id: &str,
        disabled: bool,
    ) -> Result<(), HubError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("rule {table} {rule_id} disabled={disabled}"));
        Ok(())
    }

    async fn set_firewall_rules_disabled_by_comment(
        &self,
        _config: &RouterConfig,
        table: &str,
        comment: &str,
        disabled: bool,
    ) -> Result<(), HubError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("rules {table} {comment} disabled={disabled}"));
        Ok(())
    }
}

#[async_trait]
impl RouterStateClient for FakeRouter {
    async fn address_list_contains(
        &self,
        _config: &RouterConfig,
        _list: &str,
        _address: &str,
    ) -> Result<bool, HubError> {
        Ok(*self.address_list_state.lock().unwrap())
    }

    async fn get_firewall_rule_enabled(
        &self,
        _config: &RouterConfig,
        _table: &str,
        _rule_id: &str,
    ) -> Result<bool, HubError> {
        Ok(true)
    }

    async fn get_firewall_rules_enabled_by_comment(
        &self,
        _config: &RouterConfig,
        _table: &str,
        _comment: &str,
    ) -> Result<bool, HubError> {
        Ok(true)
    }
}

/// Action that records the target it ran against, optionally failing.
pub(crate) struct RecordingAction {
    pub(crate) executions: Arc<Mutex<Vec<String>>>,
    pub(crate) fail: bool,
}

#[async_trait]
impl Action for RecordingAction {
    fn id(&self) -> &'static str {
        "test.recording"
    }

    fn metadata(&self) -> ActionMetadata {
        ActionMetadata {
            id: "test.recording".to_string(),
            label: "Recording".to_string(),
            description: String::new(),
            param_schema: Vec::new(),
        }
    }

    fn validate(&self, _target: &AutomationTarget, _params: &Params) -> Result<(), HubError> {
        Ok(())
    }

    async fn execute(
        &self,
        ctx: ActionExecutionContext<'_>,
        _params: &Params,
    ) -> Result<(), HubError> {
        let device = ctx
            .target
            .device
            .as_ref()
            .map_or_else(|| "global".to_string(), |device| device.mac.clone());
        self.executions.lock().unwrap().push(device);
        if self.fail {
            return Err(HubError::Storage("router unreachable".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn router_config() -> RouterConfig {
    RouterConfig {
        host: "192.168.88.1".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        ssl: false,
        verify_tls: false,
        poll_interval_sec: 10,
    }
}

pub(crate) fn device(mac: &str) -> DeviceView {
    DeviceView {
        mac: mac.to_string(),
        name: format!("device {mac}"),
        vendor: String::new(),
        online: true,
        last_ip: Some("10.0.0.2".to_string()),
        last_seen_at: None,
    }
}

pub(crate) fn switch_template(id: &str, scope: CapabilityScope) -> CapabilityTemplate {
    CapabilityTemplate {
        id: id.to_string(),
        label: "Test capability".to_string(),
        description: String::new(),
        category: "test".to_string(),
        scope,
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

pub(crate) fn action_instance(type_id: &str) -> ActionInstance {
    ActionInstance {
        id: "primary".to_string(),
        type_id: type_id.to_string(),
        params: Params::new(),
    }
}
