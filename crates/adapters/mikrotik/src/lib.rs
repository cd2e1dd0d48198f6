//! # routerhub-adapter-mikrotik
//!
//! MikroTik (RouterOS) flavored automation behaviors:
//!
//! - `mikrotik.address_list.set_membership` — add/remove a value in a
//!   firewall address-list
//! - `mikrotik.firewall.rule.set_enabled` — enable/disable firewall rules
//!   by ID or by comment
//! - `mikrotik.address_list.membership` — read whether a value is in an
//!   address-list
//! - `mikrotik.firewall.rule.enabled` — read whether rule(s) are enabled
//!
//! All router IO goes through the `routerhub-app` router client ports; this
//! crate holds no HTTP code itself. The composition root calls
//! [`register_defaults`] once at startup.

use std::sync::Arc;

use routerhub_app::registry::Registry;

pub mod actions;
mod resolve;
pub mod state_sources;

pub use actions::{AddressListMembershipAction, FirewallRuleToggleAction};
pub use state_sources::{AddressListMembershipSource, FirewallRuleEnabledSource};

/// Install every MikroTik action and state source into the registry.
pub fn register_defaults(registry: &mut Registry) {
    registry.register_action(Arc::new(AddressListMembershipAction));
    registry.register_action(Arc::new(FirewallRuleToggleAction));
    registry.register_state_source(Arc::new(AddressListMembershipSource));
    registry.register_state_source(Arc::new(FirewallRuleEnabledSource));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_register_all_default_behaviors() {
        let mut registry = Registry::new();
        register_defaults(&mut registry);

        assert!(registry.action("mikrotik.address_list.set_membership").is_some());
        assert!(registry.action("mikrotik.firewall.rule.set_enabled").is_some());
        assert!(registry
            .state_source("mikrotik.address_list.membership")
            .is_some());
        assert!(registry
            .state_source("mikrotik.firewall.rule.enabled")
            .is_some());
    }
}
