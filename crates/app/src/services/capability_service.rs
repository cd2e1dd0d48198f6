//! Capability service — template CRUD, read models and patch operations.

use std::sync::Arc;

use serde::Deserialize;

use routerhub_domain::capability::{
    CapabilityAssignment, CapabilityScope, CapabilityTargetRef, CapabilityTemplate,
    CapabilityUiModel, DeviceCapability, GlobalCapability, SetStateResult,
};
use routerhub_domain::device::normalize_device_id;
use routerhub_domain::error::HubError;
use routerhub_domain::time;

use crate::engine::CapabilityEngine;
use crate::ports::automation::{ActionMetadata, StateSourceMetadata};
use crate::ports::capability_repo::CapabilityRepository;
use crate::ports::device_provider::DeviceProvider;
use crate::ports::router::{RouterClient, RouterConfigProvider};
use crate::registry::Registry;
use crate::services::template_rules::{normalize_template, validate_template};

/// Partial update of one capability binding. `state` re-enters the normal
/// transition path; `enabled` flips the record without running actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilityPatch {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Front service for everything capability-related. Owns an engine for
/// transitions and talks to the repository directly for reads.
#[derive(Clone)]
pub struct CapabilityService<R, D, C> {
    repository: R,
    devices: D,
    registry: Arc<Registry>,
    engine: CapabilityEngine<R, D, C>,
}

impl<R, D, C> CapabilityService<R, D, C>
where
    R: CapabilityRepository + Clone,
    D: DeviceProvider + Clone,
    C: RouterConfigProvider,
{
    pub fn new(
        repository: R,
        devices: D,
        router_config: C,
        registry: Arc<Registry>,
        router: Arc<dyn RouterClient>,
    ) -> Self {
        let engine = CapabilityEngine::new(
            repository.clone(),
            devices.clone(),
            router_config,
            registry.clone(),
            router,
        );
        Self {
            repository,
            devices,
            registry,
            engine,
        }
    }

    /// The underlying engine, for callers that drive the sync loop.
    #[must_use]
    pub fn engine(&self) -> &CapabilityEngine<R, D, C> {
        &self.engine
    }

    /// # Errors
    ///
    /// Fails when the repository read fails.
    pub async fn list_templates(
        &self,
        search: &str,
        category: &str,
    ) -> Result<Vec<CapabilityTemplate>, HubError> {
        self.repository
            .list_templates(search.trim(), category.trim())
            .await
    }

    /// # Errors
    ///
    /// Fails with [`HubError::CapabilityNotFound`] when the ID is unknown.
    pub async fn get_template(&self, id: &str) -> Result<CapabilityTemplate, HubError> {
        let id = id.trim();
        self.repository
            .get_template(id)
            .await?
            .ok_or_else(|| HubError::CapabilityNotFound(id.to_string()))
    }

    /// Validate and store a new template.
    ///
    /// # Errors
    ///
    /// Fails with [`HubError::CapabilityInvalid`] when the template breaks a
    /// structural rule and [`HubError::CapabilityConflict`] on a duplicate ID.
    #[tracing::instrument(skip(self, template), fields(capability_id = %template.id))]
    pub async fn create_template(
        &self,
        mut template: CapabilityTemplate,
    ) -> Result<CapabilityTemplate, HubError> {
        normalize_template(&mut template);
        validate_template(&template, &self.registry)?;
        self.repository.create_template(template.clone()).await?;
        tracing::info!(capability_id = %template.id, "capability template created");
        Ok(template)
    }

    /// Validate and store changes to an existing template.
    ///
    /// A payload without a `sync` block keeps the stored sync configuration,
    /// so editors that do not surface sync settings cannot wipe them.
    ///
    /// # Errors
    ///
    /// Fails with [`HubError::CapabilityNotFound`] when the ID is unknown
    /// and [`HubError::CapabilityInvalid`] on structural violations.
    #[tracing::instrument(skip(self, template), fields(capability_id = id))]
    pub async fn update_template(
        &self,
        id: &str,
        mut template: CapabilityTemplate,
    ) -> Result<CapabilityTemplate, HubError> {
        let existing = self.get_template(id).await?;
        template.id.clone_from(&existing.id);
        normalize_template(&mut template);
        if template.sync.is_none() {
            template.sync = existing.sync;
        }
        validate_template(&template, &self.registry)?;
        self.repository.update_template(template.clone()).await?;
        tracing::info!(capability_id = %template.id, "capability template updated");
        Ok(template)
    }

    /// # Errors
    ///
    /// Fails with [`HubError::CapabilityNotFound`] when the ID is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn delete_template(&self, id: &str) -> Result<(), HubError> {
        self.repository.delete_template(id.trim()).await
    }

    /// Registered action types, sorted by ID.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionMetadata> {
        self.registry.action_types()
    }

    /// Registered state-source types, sorted by ID.
    #[must_use]
    pub fn state_source_types(&self) -> Vec<StateSourceMetadata> {
        self.registry.state_source_types()
    }

    /// Apply a partial update to one device's capability binding.
    ///
    /// # Errors
    ///
    /// Fails with [`HubError::CapabilityInvalid`] when the patch carries
    /// neither field, and with the transition's errors otherwise.
    pub async fn patch_device_capability(
        &self,
        device_id: &str,
        capability_id: &str,
        patch: CapabilityPatch,
    ) -> Result<SetStateResult, HubError> {
        if patch.state.is_none() && patch.enabled.is_none() {
            return Err(HubError::CapabilityInvalid(
                "patch must carry \"state\" or \"enabled\"".to_string(),
            ));
        }
        let mut result = SetStateResult::ok();
        if let Some(state) = &patch.state {
            result = self
                .engine
                .set_capability_state(capability_id, CapabilityTargetRef::device(device_id), state)
                .await?;
        }
        if let Some(enabled) = patch.enabled {
            self.set_device_capability_enabled(device_id, capability_id, enabled)
                .await?;
        }
        Ok(result)
    }

    /// Apply a partial update to a global capability.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::patch_device_capability`].
    pub async fn patch_global_capability(
        &self,
        capability_id: &str,
        patch: CapabilityPatch,
    ) -> Result<SetStateResult, HubError> {
        if patch.state.is_none() && patch.enabled.is_none() {
            return Err(HubError::CapabilityInvalid(
                "patch must carry \"state\" or \"enabled\"".to_string(),
            ));
        }
        let mut result = SetStateResult::ok();
        if let Some(state) = &patch.state {
            result = self
                .engine
                .set_capability_state(capability_id, CapabilityTargetRef::global(), state)
                .await?;
        }
        if let Some(enabled) = patch.enabled {
            self.set_global_capability_enabled(capability_id, enabled)
                .await?;
        }
        Ok(result)
    }

    /// Flip one device binding on or off without touching the router.
    ///
    /// Disabling freezes the persisted state and excludes the binding from
    /// sync; the next state transition re-enables it.
    ///
    /// # Errors
    ///
    /// Fails when the template is unknown or not device-scoped.
    #[tracing::instrument(skip(self))]
    pub async fn set_device_capability_enabled(
        &self,
        device_id: &str,
        capability_id: &str,
        enabled: bool,
    ) -> Result<(), HubError> {
        let device_id = normalize_device_id(device_id);
        let template = self.get_template(capability_id).await?;
        if template.scope != CapabilityScope::Device {
            return Err(HubError::CapabilityScopeMismatch {
                template: template.scope,
                target: CapabilityScope::Device,
            });
        }
        let state = self
            .repository
            .get_device_capability(&device_id, &template.id)
            .await?
            .map(|record| record.state)
            .filter(|state| !state.is_empty())
            .unwrap_or_else(|| template.default_state.clone());
        self.repository
            .upsert_device_capability(DeviceCapability {
                device_id,
                capability_id: template.id,
                enabled,
                state,
                updated_at: time::now(),
            })
            .await
    }

    /// Flip a global capability on or off without touching the router.
    ///
    /// # Errors
    ///
    /// Fails when the template is unknown or not global-scoped.
    #[tracing::instrument(skip(self))]
    pub async fn set_global_capability_enabled(
        &self,
        capability_id: &str,
        enabled: bool,
    ) -> Result<(), HubError> {
        let template = self.get_template(capability_id).await?;
        if template.scope != CapabilityScope::Global {
            return Err(HubError::CapabilityScopeMismatch {
                template: template.scope,
                target: CapabilityScope::Global,
            });
        }
        let state = self
            .repository
            .get_global_capability(&template.id)
            .await?
            .map(|record| record.state)
            .filter(|state| !state.is_empty())
            .unwrap_or_else(|| template.default_state.clone());
        self.repository
            .save_global_capability(GlobalCapability {
                capability_id: template.id,
                enabled,
                state,
            })
            .await
    }

    /// Controls UI read model for one device: every device-scoped template
    /// overlaid with the device's persisted state, defaults where nothing is
    /// stored yet. Sorted by label, then ID.
    ///
    /// # Errors
    ///
    /// Fails when a repository read fails.
    pub async fn device_capabilities(
        &self,
        device_id: &str,
    ) -> Result<Vec<CapabilityUiModel>, HubError> {
        let device_id = normalize_device_id(device_id);
        let templates = self.repository.list_templates("", "").await?;
        let records = self.repository.list_device_capabilities(&device_id).await?;

        let mut models: Vec<CapabilityUiModel> = templates
            .into_iter()
            .filter(|template| template.scope == CapabilityScope::Device)
            .map(|template| {
                let record = records.get(&template.id);
                ui_model(template, record.map(|r| (r.enabled, r.state.clone())))
            })
            .collect();
        sort_ui_models(&mut models);
        Ok(models)
    }

    /// Controls UI read model for global capabilities. Sorted by label,
    /// then ID.
    ///
    /// # Errors
    ///
    /// Fails when a repository read fails.
    pub async fn global_capabilities(&self) -> Result<Vec<CapabilityUiModel>, HubError> {
        let templates = self.repository.list_templates("", "").await?;
        let records: std::collections::HashMap<String, GlobalCapability> = self
            .repository
            .list_global_capabilities()
            .await?
            .into_iter()
            .map(|record| (record.capability_id.clone(), record))
            .collect();

        let mut models: Vec<CapabilityUiModel> = templates
            .into_iter()
            .filter(|template| template.scope == CapabilityScope::Global)
            .map(|template| {
                let record = records.get(&template.id);
                ui_model(template, record.map(|r| (r.enabled, r.state.clone())))
            })
            .collect();
        sort_ui_models(&mut models);
        Ok(models)
    }

    /// Which devices a capability is bound to, with their current state.
    /// Sorted by device name, then device ID.
    ///
    /// # Errors
    ///
    /// Fails when the template is unknown or not device-scoped.
    pub async fn capability_assignments(
        &self,
        capability_id: &str,
    ) -> Result<Vec<CapabilityAssignment>, HubError> {
        let template = self.get_template(capability_id).await?;
        if template.scope != CapabilityScope::Device {
            return Err(HubError::CapabilityScopeMismatch {
                template: template.scope,
                target: CapabilityScope::Device,
            });
        }
        let records = self.repository.list_capability_devices(&template.id).await?;

        let mut assignments = Vec::with_capacity(records.len());
        for (device_id, record) in records {
            let device = self.devices.get_device(&device_id).await?;
            let (name, ip, online) = device.map_or_else(
                || (device_id.clone(), String::new(), false),
                |view| {
                    let name = if view.name.is_empty() {
                        view.mac.clone()
                    } else {
                        view.name
                    };
                    (name, view.last_ip.unwrap_or_default(), view.online)
                },
            );
            let state = if record.state.is_empty() {
                template.default_state.clone()
            } else {
                record.state
            };
            assignments.push(CapabilityAssignment {
                device_id,
                device_name: name,
                device_ip: ip,
                online,
                enabled: record.enabled,
                state,
            });
        }
        assignments.sort_by(|a, b| {
            (a.device_name.to_lowercase(), &a.device_id)
                .cmp(&(b.device_name.to_lowercase(), &b.device_id))
        });
        Ok(assignments)
    }
}

fn ui_model(template: CapabilityTemplate, record: Option<(bool, String)>) -> CapabilityUiModel {
    let (enabled, state) = record.map_or((true, String::new()), |(enabled, state)| {
        (enabled, state)
    });
    let state = if state.is_empty() {
        template.default_state
    } else {
        state
    };
    CapabilityUiModel {
        id: template.id,
        label: template.label,
        description: template.description,
        control: template.control,
        state,
        enabled,
    }
}

fn sort_ui_models(models: &mut [CapabilityUiModel]) {
    models.sort_by(|a, b| {
        (a.label.to_lowercase(), &a.id).cmp(&(b.label.to_lowercase(), &b.id))
    });
}
