//! Router client ports — side effects and state reads against the router.
//!
//! These traits are handed to `dyn` actions and state sources through
//! execution contexts, so unlike the repository ports they must be
//! dyn-compatible (hence `async_trait` instead of RPIT futures).
//!
//! Implementations are expected to be idempotent at this boundary: adding
//! an address-list entry that already exists succeeds, as does removing one
//! that is absent. Zero rules matching a comment-based toggle or read is an
//! error, not a no-op.

use async_trait::async_trait;

use routerhub_domain::error::HubError;
use routerhub_domain::router::RouterConfig;

/// Exposes the current add-on router configuration.
pub trait RouterConfigProvider: Send + Sync {
    /// The active configuration, or `None` while the add-on is unconfigured.
    fn get(&self) -> Option<RouterConfig>;
}

/// Write operations used by actions.
#[async_trait]
pub trait RouterActionClient: Send + Sync {
    async fn add_address_list_entry(
        &self,
        config: &RouterConfig,
        list: &str,
        address: &str,
    ) -> Result<(), HubError>;

    async fn remove_address_list_entry(
        &self,
        config: &RouterConfig,
        list: &str,
        address: &str,
    ) -> Result<(), HubError>;

    async fn set_firewall_rule_disabled(
        &self,
        config: &RouterConfig,
        table: &str,
        rule_id: &str,
        disabled: bool,
    ) -> Result<(), HubError>;

    async fn set_firewall_rules_disabled_by_comment(
        &self,
        config: &RouterConfig,
        table: &str,
        comment: &str,
        disabled: bool,
    ) -> Result<(), HubError>;
}

/// Read operations used by state sources.
#[async_trait]
pub trait RouterStateClient: Send + Sync {
    async fn address_list_contains(
        &self,
        config: &RouterConfig,
        list: &str,
        address: &str,
    ) -> Result<bool, HubError>;

    async fn get_firewall_rule_enabled(
        &self,
        config: &RouterConfig,
        table: &str,
        rule_id: &str,
    ) -> Result<bool, HubError>;

    /// Logical AND across all rules carrying the comment (all-enabled ⇒
    /// `true`). Zero matches is an error.
    async fn get_firewall_rules_enabled_by_comment(
        &self,
        config: &RouterConfig,
        table: &str,
        comment: &str,
    ) -> Result<bool, HubError>;
}

/// Combined action/state client dependency of the engine.
pub trait RouterClient: RouterActionClient + RouterStateClient {}

impl<T: RouterActionClient + RouterStateClient> RouterClient for T {}
