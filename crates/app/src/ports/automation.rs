//! Pluggable automation contracts — actions and state sources.
//!
//! An **action** is a side-effecting operation run when a capability enters
//! a state; a **state source** is a read-only probe of external router
//! truth used for sync. Concrete implementations live in adapter crates
//! (e.g. `routerhub-adapter-mikrotik`) and are installed into the
//! [`Registry`](crate::registry::Registry) at process start. Both contracts
//! are dyn-compatible so the registry can hold them behind `Arc<dyn …>`.

use async_trait::async_trait;

use routerhub_domain::capability::{AutomationTarget, ParamField, Params};
use routerhub_domain::error::HubError;
use routerhub_domain::router::RouterConfig;

use crate::ports::router::{RouterActionClient, RouterStateClient};

/// Describes an action type and its parameters for UI forms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ActionMetadata {
    pub id: String,
    pub label: String,
    pub description: String,
    pub param_schema: Vec<ParamField>,
}

/// Describes an external state provider for sync configuration UI.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateSourceMetadata {
    pub id: String,
    pub label: String,
    pub description: String,
    pub output_type: String,
    pub param_schema: Vec<ParamField>,
}

/// Runtime dependencies for one action execution.
pub struct ActionExecutionContext<'a> {
    pub target: &'a AutomationTarget,
    pub router: &'a dyn RouterActionClient,
    pub config: &'a RouterConfig,
}

/// Runtime dependencies for one state-source read.
pub struct StateSourceContext<'a> {
    pub target: &'a AutomationTarget,
    pub router: &'a dyn RouterStateClient,
    pub config: &'a RouterConfig,
}

/// Pluggable behavior executed on capability state transitions.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique registry key, e.g. `mikrotik.address_list.set_membership`.
    fn id(&self) -> &'static str;

    /// UI descriptor including the parameter schema.
    fn metadata(&self) -> ActionMetadata;

    /// Check the configured params against this action's schema and the
    /// target's scope, without touching the router.
    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError>;

    /// Apply the side effect.
    async fn execute(
        &self,
        ctx: ActionExecutionContext<'_>,
        params: &Params,
    ) -> Result<(), HubError>;
}

/// Pluggable read-only probe of external truth for one capability/target.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Unique registry key, e.g. `mikrotik.address_list.membership`.
    fn id(&self) -> &'static str;

    /// UI descriptor including the parameter schema.
    fn metadata(&self) -> StateSourceMetadata;

    /// Check the configured params against this source's schema and the
    /// target's scope, without touching the router.
    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError>;

    /// Read the external boolean truth.
    async fn read(&self, ctx: StateSourceContext<'_>, params: &Params) -> Result<bool, HubError>;
}
