//! Read-only RouterOS state probes used for sync.

mod address_list;
mod firewall_rule;

pub use address_list::AddressListMembershipSource;
pub use firewall_rule::FirewallRuleEnabledSource;
