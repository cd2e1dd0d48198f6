//! `mikrotik.firewall.rule.set_enabled` — toggle firewall rules.

use async_trait::async_trait;

use routerhub_app::ports::automation::{Action, ActionExecutionContext, ActionMetadata};
use routerhub_domain::capability::{AutomationTarget, ParamField, ParamKind, Params, string_param};
use routerhub_domain::error::HubError;

use crate::resolve::{
    firewall_match_fields, firewall_table_field, validate_firewall_match, validate_firewall_table,
};

pub(crate) const ID: &str = "mikrotik.firewall.rule.set_enabled";

/// Enables or disables RouterOS firewall rules, one by ID or all carrying a
/// comment.
pub struct FirewallRuleToggleAction;

#[async_trait]
impl Action for FirewallRuleToggleAction {
    fn id(&self) -> &'static str {
        ID
    }

    fn metadata(&self) -> ActionMetadata {
        let mut param_schema = vec![
            firewall_table_field(),
            ParamField {
                key: "mode".to_string(),
                label: "Mode".to_string(),
                kind: ParamKind::Enum,
                required: true,
                description: "Enable or disable selected rule(s)".to_string(),
                options: vec!["enable".to_string(), "disable".to_string()],
                visible_if: None,
            },
        ];
        param_schema.extend(firewall_match_fields(
            "Choose whether to target one rule id or all rules by comment",
        ));
        ActionMetadata {
            id: ID.to_string(),
            label: "MikroTik: Firewall rule toggle".to_string(),
            description: "Enable or disable firewall rule in filter/nat/mangle/raw tables"
                .to_string(),
            param_schema,
        }
    }

    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError> {
        validate_firewall_table(params)?;
        let mode = string_param(params, "mode")?;
        if mode != "enable" && mode != "disable" {
            return Err(HubError::CapabilityInvalid(format!(
                "unsupported mode {mode:?}"
            )));
        }
        validate_firewall_match(target.scope, params)?;
        Ok(())
    }

    async fn execute(
        &self,
        ctx: ActionExecutionContext<'_>,
        params: &Params,
    ) -> Result<(), HubError> {
        self.validate(ctx.target, params)?;

        let table = string_param(params, "table")?;
        let mode = string_param(params, "mode")?;
        let match_by = string_param(params, "match_by")?;
        let disabled = mode.eq_ignore_ascii_case("disable");

        if match_by == "id" {
            let rule_id = string_param(params, "rule_id")?;
            ctx.router
                .set_firewall_rule_disabled(ctx.config, &table, &rule_id, disabled)
                .await
        } else {
            let comment = string_param(params, "comment")?;
            ctx.router
                .set_firewall_rules_disabled_by_comment(ctx.config, &table, &comment, disabled)
                .await
        }
    }
}
