//! Side-effecting RouterOS actions.

mod address_list;
mod firewall_rule;

pub use address_list::AddressListMembershipAction;
pub use firewall_rule::FirewallRuleToggleAction;
