//! `mikrotik.firewall.rule.enabled` — read firewall rule enabled state.

use async_trait::async_trait;

use routerhub_app::ports::automation::{StateSource, StateSourceContext, StateSourceMetadata};
use routerhub_domain::capability::{AutomationTarget, Params, string_param};
use routerhub_domain::error::HubError;

use crate::resolve::{firewall_match_fields, firewall_table_field, validate_firewall_match, validate_firewall_table};

pub(crate) const ID: &str = "mikrotik.firewall.rule.enabled";

/// Reads whether firewall rule(s) are enabled. Comment matching reports
/// `true` only when every rule carrying the comment is enabled; zero
/// matching rules is an error surfaced by the router client.
pub struct FirewallRuleEnabledSource;

#[async_trait]
impl StateSource for FirewallRuleEnabledSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn metadata(&self) -> StateSourceMetadata {
        let mut param_schema = vec![firewall_table_field()];
        param_schema.extend(firewall_match_fields(
            "Choose whether to read one rule id or all rules by comment",
        ));
        StateSourceMetadata {
            id: ID.to_string(),
            label: "MikroTik: Firewall rule enabled".to_string(),
            description:
                "Checks whether firewall rule is currently enabled in filter/nat/mangle/raw tables"
                    .to_string(),
            output_type: "boolean".to_string(),
            param_schema,
        }
    }

    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError> {
        validate_firewall_table(params)?;
        validate_firewall_match(target.scope, params)?;
        Ok(())
    }

    async fn read(&self, ctx: StateSourceContext<'_>, params: &Params) -> Result<bool, HubError> {
        self.validate(ctx.target, params)?;

        let table = string_param(params, "table")?;
        let match_by = string_param(params, "match_by")?;

        if match_by == "id" {
            let rule_id = string_param(params, "rule_id")?;
            ctx.router
                .get_firewall_rule_enabled(ctx.config, &table, &rule_id)
                .await
        } else {
            let comment = string_param(params, "comment")?;
            ctx.router
                .get_firewall_rules_enabled_by_comment(ctx.config, &table, &comment)
                .await
        }
    }
}
