//! Capability engine — state transitions and periodic reconciliation.
//!
//! The engine is the only writer of persisted capability state. A state
//! transition runs the target state's configured actions against the router
//! and then commits the new state; action failures are collected as
//! warnings and never abort the transition, so persisted state always
//! reflects the operator's latest intent. Reconciliation reads external
//! truth through state sources and folds drift back into persisted state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use routerhub_domain::capability::{
    ActionExecutionWarning, AutomationTarget, CapabilityScope, CapabilityTargetRef,
    CapabilityTemplate, DeviceCapability, GlobalCapability, SetStateResult, SyncMode,
};
use routerhub_domain::device::{ListFilter, normalize_device_id};
use routerhub_domain::error::HubError;
use routerhub_domain::router::RouterConfig;
use routerhub_domain::time;

use crate::ports::automation::{ActionExecutionContext, StateSourceContext};
use crate::ports::capability_repo::CapabilityRepository;
use crate::ports::device_provider::DeviceProvider;
use crate::ports::router::{RouterClient, RouterConfigProvider};
use crate::registry::Registry;

/// Upper bound on a single action execution. A hung router call must not
/// stall the transition forever.
const ACTION_TIMEOUT: Duration = Duration::from_secs(12);

/// Reconciliation cadence used when the caller does not pick one.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(20);

/// Orchestrates capability state transitions and sync.
#[derive(Clone)]
pub struct CapabilityEngine<R, D, C> {
    repository: R,
    devices: D,
    router_config: C,
    registry: Arc<Registry>,
    router: Arc<dyn RouterClient>,
}

impl<R, D, C> CapabilityEngine<R, D, C>
where
    R: CapabilityRepository,
    D: DeviceProvider,
    C: RouterConfigProvider,
{
    pub fn new(
        repository: R,
        devices: D,
        router_config: C,
        registry: Arc<Registry>,
        router: Arc<dyn RouterClient>,
    ) -> Self {
        Self {
            repository,
            devices,
            router_config,
            registry,
            router,
        }
    }

    /// Transition a capability to `new_state` for the given target.
    ///
    /// The transition is idempotent: when the target is already enabled and
    /// in `new_state`, nothing runs and nothing is written. Otherwise every
    /// action configured on the entered state is attempted in order, each
    /// failure becoming a warning, and the new state is committed
    /// unconditionally afterwards.
    ///
    /// # Errors
    ///
    /// Fails when the template is unknown, the state is not declared, the
    /// target scope does not match the template, the target device is
    /// unknown, or the state store rejects the write. Action failures are
    /// not errors; they surface in [`SetStateResult::warnings`].
    #[tracing::instrument(
        skip_all,
        fields(capability_id = capability_id.trim(), state = new_state.trim(), device_id = tracing::field::Empty)
    )]
    pub async fn set_capability_state(
        &self,
        capability_id: &str,
        target: CapabilityTargetRef,
        new_state: &str,
    ) -> Result<SetStateResult, HubError> {
        let capability_id = capability_id.trim();
        let new_state = new_state.trim();
        let target = normalize_target_ref(target);
        if target.scope == CapabilityScope::Device && target.device_id.is_empty() {
            return Err(HubError::CapabilityInvalid(
                "device id is required for device scope".to_string(),
            ));
        }
        tracing::Span::current().record("device_id", target.device_id.as_str());

        let template = self
            .repository
            .get_template(capability_id)
            .await?
            .ok_or_else(|| HubError::CapabilityNotFound(capability_id.to_string()))?;

        if template.scope != target.scope {
            return Err(HubError::CapabilityScopeMismatch {
                template: template.scope,
                target: target.scope,
            });
        }
        if !template.has_state(new_state) {
            return Err(HubError::CapabilityStateInvalid(format!(
                "capability {capability_id:?} has no state {new_state:?}"
            )));
        }

        let automation_target = self.resolve_automation_target(&target).await?;
        let (enabled, current_state) = self.current_state(&template, &target).await?;
        if enabled && current_state == new_state {
            tracing::debug!(capability_id, state = new_state, "state already applied");
            return Ok(SetStateResult::ok());
        }

        let warnings = self
            .run_state_actions(&template, new_state, &automation_target)
            .await;

        self.persist_state(&template, &target, new_state).await?;
        tracing::info!(
            capability_id,
            state = new_state,
            warnings = warnings.len(),
            "capability state applied"
        );
        Ok(SetStateResult { ok: true, warnings })
    }

    /// Run one reconciliation pass over every sync-enabled template.
    ///
    /// Per-target failures are collected and reported together; a bad
    /// target never prevents the rest of the pass from running.
    ///
    /// # Errors
    ///
    /// Fails with [`HubError::AddonNotConfigured`] when no router is
    /// configured, and with [`HubError::SyncFailed`] aggregating every
    /// per-target failure message otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn sync_once(&self) -> Result<(), HubError> {
        let config = self
            .router_config
            .get()
            .ok_or(HubError::AddonNotConfigured)?;

        let templates = self.repository.list_templates("", "").await?;
        let mut errors = Vec::new();
        for template in templates.iter().filter(|t| t.sync_enabled()) {
            self.sync_template(template, &config, &mut errors).await;
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HubError::SyncFailed(errors))
        }
    }

    /// Run [`Self::sync_once`] on a fixed cadence until `shutdown` flips to
    /// `true`. Pass failures are logged and swallowed; the loop never dies.
    pub async fn run_sync_loop(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sync_once().await {
                        tracing::warn!(error = %err, "capability sync pass failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("capability sync loop stopping");
                        return;
                    }
                }
            }
        }
    }

    async fn sync_template(
        &self,
        template: &CapabilityTemplate,
        config: &RouterConfig,
        errors: &mut Vec<String>,
    ) {
        let Some(sync) = template.sync.clone() else {
            return;
        };
        let Some(source) = self.registry.state_source(&sync.source.type_id) else {
            errors.push(format!(
                "capability {:?}: sync source {:?} is not registered",
                template.id, sync.source.type_id
            ));
            return;
        };

        let targets = match template.scope {
            CapabilityScope::Global => vec![CapabilityTargetRef::global()],
            CapabilityScope::Device => match self.devices.list_devices(ListFilter::default()).await
            {
                Ok(devices) => devices
                    .into_iter()
                    .map(|device| CapabilityTargetRef::device(device.mac))
                    .collect(),
                Err(err) => {
                    errors.push(format!("capability {:?}: list devices: {err}", template.id));
                    return;
                }
            },
        };

        for target in targets {
            let (enabled, current_state) = match self.current_state(template, &target).await {
                Ok(state) => state,
                Err(err) => {
                    errors.push(format!(
                        "capability {:?} target {:?}: load state: {err}",
                        template.id, target.device_id
                    ));
                    continue;
                }
            };
            if !enabled {
                continue;
            }
            if sync.mode == SyncMode::InternalTruth {
                continue;
            }

            let automation_target = match self.resolve_automation_target(&target).await {
                Ok(automation_target) => automation_target,
                Err(err) => {
                    errors.push(format!(
                        "capability {:?} target {:?}: {err}",
                        template.id, target.device_id
                    ));
                    continue;
                }
            };
            if let Err(err) = source.validate(&automation_target, &sync.source.params) {
                errors.push(format!("capability {:?}: sync source: {err}", template.id));
                continue;
            }

            let ctx = StateSourceContext {
                target: &automation_target,
                router: self.router.as_ref(),
                config,
            };
            let value = match source.read(ctx, &sync.source.params).await {
                Ok(value) => value,
                Err(err) => {
                    errors.push(format!(
                        "capability {:?} target {:?}: read source: {err}",
                        template.id, target.device_id
                    ));
                    continue;
                }
            };

            let desired = if value {
                sync.mapping.when_true.as_str()
            } else {
                sync.mapping.when_false.as_str()
            };
            if desired.is_empty() || desired == current_state {
                continue;
            }

            tracing::info!(
                capability_id = %template.id,
                device_id = %target.device_id,
                from = %current_state,
                to = desired,
                "external state drift detected"
            );
            let applied = if sync.trigger_actions_on_sync {
                self.set_capability_state(&template.id, target.clone(), desired)
                    .await
                    .map(|_| ())
            } else {
                self.persist_state(template, &target, desired).await
            };
            if let Err(err) = applied {
                errors.push(format!(
                    "capability {:?} target {:?}: apply {desired:?}: {err}",
                    template.id, target.device_id
                ));
            }
        }
    }

    async fn run_state_actions(
        &self,
        template: &CapabilityTemplate,
        state: &str,
        target: &AutomationTarget,
    ) -> Vec<ActionExecutionWarning> {
        let mut warnings = Vec::new();
        let Some(state_config) = template.states.get(state) else {
            return warnings;
        };
        let config = self.router_config.get();

        for instance in &state_config.actions_on_enter {
            let warn = |message: String| ActionExecutionWarning {
                action_id: instance.id.clone(),
                type_id: instance.type_id.clone(),
                message,
            };

            let Some(action) = self.registry.action(&instance.type_id) else {
                warnings.push(warn(format!(
                    "action type {:?} is not registered",
                    instance.type_id
                )));
                continue;
            };
            if let Err(err) = action.validate(target, &instance.params) {
                warnings.push(warn(err.to_string()));
                continue;
            }
            let Some(config) = config.as_ref() else {
                warnings.push(warn(HubError::AddonNotConfigured.to_string()));
                continue;
            };

            let ctx = ActionExecutionContext {
                target,
                router: self.router.as_ref(),
                config,
            };
            let started = tokio::time::Instant::now();
            let outcome = tokio::time::timeout(ACTION_TIMEOUT, action.execute(ctx, &instance.params))
                .await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(
                        capability_id = %template.id,
                        action_type = %instance.type_id,
                        duration_ms,
                        "action executed"
                    );
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        capability_id = %template.id,
                        action_type = %instance.type_id,
                        duration_ms,
                        error = %err,
                        "action failed"
                    );
                    warnings.push(warn(err.to_string()));
                }
                Err(_) => {
                    tracing::warn!(
                        capability_id = %template.id,
                        action_type = %instance.type_id,
                        duration_ms,
                        "action timed out"
                    );
                    warnings.push(warn(format!(
                        "timed out after {}s",
                        ACTION_TIMEOUT.as_secs()
                    )));
                }
            }
        }
        warnings
    }

    async fn resolve_automation_target(
        &self,
        target: &CapabilityTargetRef,
    ) -> Result<AutomationTarget, HubError> {
        match target.scope {
            CapabilityScope::Global => Ok(AutomationTarget::global()),
            CapabilityScope::Device => {
                let device = self
                    .devices
                    .get_device(&target.device_id)
                    .await?
                    .ok_or_else(|| HubError::DeviceNotFound(target.device_id.clone()))?;
                Ok(AutomationTarget::device(device))
            }
        }
    }

    /// Current `(enabled, state)` for the target, falling back to the
    /// template default when nothing is persisted yet or the stored state
    /// name is empty.
    async fn current_state(
        &self,
        template: &CapabilityTemplate,
        target: &CapabilityTargetRef,
    ) -> Result<(bool, String), HubError> {
        let (enabled, state) = match target.scope {
            CapabilityScope::Device => self
                .repository
                .get_device_capability(&target.device_id, &template.id)
                .await?
                .map_or((true, String::new()), |record| (record.enabled, record.state)),
            CapabilityScope::Global => self
                .repository
                .get_global_capability(&template.id)
                .await?
                .map_or((true, String::new()), |record| (record.enabled, record.state)),
        };
        if state.is_empty() {
            Ok((enabled, template.default_state.clone()))
        } else {
            Ok((enabled, state))
        }
    }

    async fn persist_state(
        &self,
        template: &CapabilityTemplate,
        target: &CapabilityTargetRef,
        state: &str,
    ) -> Result<(), HubError> {
        match target.scope {
            CapabilityScope::Device => {
                self.repository
                    .upsert_device_capability(DeviceCapability {
                        device_id: target.device_id.clone(),
                        capability_id: template.id.clone(),
                        enabled: true,
                        state: state.to_string(),
                        updated_at: time::now(),
                    })
                    .await
            }
            CapabilityScope::Global => {
                self.repository
                    .save_global_capability(GlobalCapability {
                        capability_id: template.id.clone(),
                        enabled: true,
                        state: state.to_string(),
                    })
                    .await
            }
        }
    }
}

fn normalize_target_ref(target: CapabilityTargetRef) -> CapabilityTargetRef {
    match target.scope {
        CapabilityScope::Global => CapabilityTargetRef::global(),
        CapabilityScope::Device => CapabilityTargetRef::device(normalize_device_id(&target.device_id)),
    }
}
