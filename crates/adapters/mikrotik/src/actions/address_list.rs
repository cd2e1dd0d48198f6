//! `mikrotik.address_list.set_membership` — toggle one address-list entry.

use async_trait::async_trait;

use routerhub_app::ports::automation::{Action, ActionExecutionContext, ActionMetadata};
use routerhub_domain::capability::{AutomationTarget, ParamField, ParamKind, Params, string_param};
use routerhub_domain::error::HubError;

use crate::resolve::{
    address_list_field, address_target_fields, resolve_target_address, validate_address_target,
};

pub(crate) const ID: &str = "mikrotik.address_list.set_membership";

/// Adds or removes a value in a RouterOS firewall address-list.
pub struct AddressListMembershipAction;

#[async_trait]
impl Action for AddressListMembershipAction {
    fn id(&self) -> &'static str {
        ID
    }

    fn metadata(&self) -> ActionMetadata {
        let mut param_schema = vec![
            address_list_field(),
            ParamField {
                key: "mode".to_string(),
                label: "Mode".to_string(),
                kind: ParamKind::Enum,
                required: true,
                description: "Whether to add or remove target from the list".to_string(),
                options: vec!["add".to_string(), "remove".to_string()],
                visible_if: None,
            },
        ];
        param_schema.extend(address_target_fields());
        ActionMetadata {
            id: ID.to_string(),
            label: "MikroTik: Address-list membership".to_string(),
            description: "Add or remove a target value in a MikroTik firewall address-list"
                .to_string(),
            param_schema,
        }
    }

    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError> {
        string_param(params, "list")?;
        let mode = string_param(params, "mode")?;
        if mode != "add" && mode != "remove" {
            return Err(HubError::CapabilityInvalid(format!(
                "unsupported mode {mode:?}"
            )));
        }
        validate_address_target(target.scope, params)
    }

    async fn execute(
        &self,
        ctx: ActionExecutionContext<'_>,
        params: &Params,
    ) -> Result<(), HubError> {
        self.validate(ctx.target, params)?;

        let list = string_param(params, "list")?;
        let mode = string_param(params, "mode")?;
        let target_kind = string_param(params, "target")?;
        let address = resolve_target_address(&target_kind, params, ctx.target)?;

        if mode == "add" {
            ctx.router
                .add_address_list_entry(ctx.config, &list, &address)
                .await
        } else {
            ctx.router
                .remove_address_list_entry(ctx.config, &list, &address)
                .await
        }
    }
}
