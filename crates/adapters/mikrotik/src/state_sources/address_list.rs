//! `mikrotik.address_list.membership` — read address-list membership.

use async_trait::async_trait;

use routerhub_app::ports::automation::{StateSource, StateSourceContext, StateSourceMetadata};
use routerhub_domain::capability::{AutomationTarget, Params, string_param};
use routerhub_domain::error::HubError;

use crate::resolve::{
    address_list_field, address_target_fields, resolve_target_address, validate_address_target,
};

pub(crate) const ID: &str = "mikrotik.address_list.membership";

/// Reads whether a value currently sits in a RouterOS firewall address-list.
pub struct AddressListMembershipSource;

#[async_trait]
impl StateSource for AddressListMembershipSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn metadata(&self) -> StateSourceMetadata {
        let mut param_schema = vec![address_list_field()];
        param_schema.extend(address_target_fields());
        StateSourceMetadata {
            id: ID.to_string(),
            label: "MikroTik: Address-list membership".to_string(),
            description:
                "Checks whether target value currently exists in MikroTik firewall address-list"
                    .to_string(),
            output_type: "boolean".to_string(),
            param_schema,
        }
    }

    fn validate(&self, target: &AutomationTarget, params: &Params) -> Result<(), HubError> {
        string_param(params, "list")?;
        validate_address_target(target.scope, params)
    }

    async fn read(&self, ctx: StateSourceContext<'_>, params: &Params) -> Result<bool, HubError> {
        self.validate(ctx.target, params)?;

        let list = string_param(params, "list")?;
        let target_kind = string_param(params, "target")?;
        let address = resolve_target_address(&target_kind, params, ctx.target)?;

        ctx.router
            .address_list_contains(ctx.config, &list, &address)
            .await
    }
}
