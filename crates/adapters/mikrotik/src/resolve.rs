//! Shared parameter handling for the address-list and firewall behaviors.

use routerhub_domain::capability::{
    AutomationTarget, CapabilityScope, ParamField, ParamKind, Params, VisibleIf,
    contains_device_placeholder, string_param,
};
use routerhub_domain::error::HubError;

pub(crate) const FIREWALL_TABLES: [&str; 4] = ["filter", "nat", "mangle", "raw"];

/// Resolve the address value a behavior operates on.
///
/// `device.ip` and `device.mac` read the live device snapshot; `literal_ip`
/// reads the configured parameter. A device target with no usable value is
/// an error, not an empty string.
pub(crate) fn resolve_target_address(
    target_kind: &str,
    params: &Params,
    target: &AutomationTarget,
) -> Result<String, HubError> {
    match target_kind {
        "device.ip" => target
            .device
            .as_ref()
            .and_then(|device| device.last_ip.as_deref())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| invalid("device IP is empty")),
        "device.mac" => target
            .device
            .as_ref()
            .map(|device| device.mac.trim())
            .filter(|mac| !mac.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| invalid("device MAC is empty")),
        "literal_ip" => string_param(params, "literal_ip"),
        other => Err(invalid(format!("unsupported target {other:?}"))),
    }
}

/// Validate the `target` / `literal_ip` parameter pair against the scope.
///
/// Device-derived targets need a device, so they are rejected under global
/// scope; literal values under global scope must not smuggle a
/// `{{device.*}}` placeholder, there is no device to resolve it against.
pub(crate) fn validate_address_target(
    scope: CapabilityScope,
    params: &Params,
) -> Result<(), HubError> {
    let target_kind = string_param(params, "target")?;
    match target_kind.as_str() {
        "device.ip" | "device.mac" => {
            if scope == CapabilityScope::Global {
                return Err(invalid(format!(
                    "target {target_kind:?} is not available for global scope"
                )));
            }
        }
        "literal_ip" => {
            let literal = string_param(params, "literal_ip")?;
            reject_global_placeholder(scope, &literal)?;
        }
        other => return Err(invalid(format!("unsupported target {other:?}"))),
    }
    Ok(())
}

/// Validate the `table` parameter, returning its value.
pub(crate) fn validate_firewall_table(params: &Params) -> Result<String, HubError> {
    let table = string_param(params, "table")?;
    if !FIREWALL_TABLES.contains(&table.as_str()) {
        return Err(invalid(format!("unsupported table {table:?}")));
    }
    Ok(table)
}

/// Validate the `match_by` / `rule_id` / `comment` parameter group,
/// returning the match mode.
pub(crate) fn validate_firewall_match(
    scope: CapabilityScope,
    params: &Params,
) -> Result<String, HubError> {
    let match_by = string_param(params, "match_by")?;
    match match_by.as_str() {
        "id" => {
            let rule_id = string_param(params, "rule_id")?;
            reject_global_placeholder(scope, &rule_id)?;
        }
        "comment" => {
            let comment = string_param(params, "comment")?;
            reject_global_placeholder(scope, &comment)?;
        }
        other => return Err(invalid(format!("unsupported match_by {other:?}"))),
    }
    Ok(match_by)
}

fn reject_global_placeholder(scope: CapabilityScope, value: &str) -> Result<(), HubError> {
    if scope == CapabilityScope::Global && contains_device_placeholder(value) {
        return Err(invalid("global scope does not support device placeholders"));
    }
    Ok(())
}

pub(crate) fn address_target_fields() -> Vec<ParamField> {
    vec![
        ParamField {
            key: "target".to_string(),
            label: "Target".to_string(),
            kind: ParamKind::Enum,
            required: true,
            description: "Source value to apply in address-list".to_string(),
            options: vec![
                "device.ip".to_string(),
                "device.mac".to_string(),
                "literal_ip".to_string(),
            ],
            visible_if: None,
        },
        ParamField {
            key: "literal_ip".to_string(),
            label: "Literal IP".to_string(),
            kind: ParamKind::String,
            required: true,
            description: String::new(),
            options: Vec::new(),
            visible_if: Some(VisibleIf {
                key: "target".to_string(),
                equals: "literal_ip".to_string(),
            }),
        },
    ]
}

pub(crate) fn address_list_field() -> ParamField {
    ParamField {
        key: "list".to_string(),
        label: "Address-list name".to_string(),
        kind: ParamKind::String,
        required: true,
        description: "RouterOS firewall address-list name".to_string(),
        options: Vec::new(),
        visible_if: None,
    }
}

pub(crate) fn firewall_table_field() -> ParamField {
    ParamField {
        key: "table".to_string(),
        label: "Firewall table".to_string(),
        kind: ParamKind::Enum,
        required: true,
        description: "RouterOS firewall table where the rule exists".to_string(),
        options: FIREWALL_TABLES.iter().map(ToString::to_string).collect(),
        visible_if: None,
    }
}

pub(crate) fn firewall_match_fields(description: &str) -> Vec<ParamField> {
    vec![
        ParamField {
            key: "match_by".to_string(),
            label: "Match by".to_string(),
            kind: ParamKind::Enum,
            required: true,
            description: description.to_string(),
            options: vec!["id".to_string(), "comment".to_string()],
            visible_if: None,
        },
        ParamField {
            key: "rule_id".to_string(),
            label: "Rule id".to_string(),
            kind: ParamKind::String,
            required: true,
            description: String::new(),
            options: Vec::new(),
            visible_if: Some(VisibleIf {
                key: "match_by".to_string(),
                equals: "id".to_string(),
            }),
        },
        ParamField {
            key: "comment".to_string(),
            label: "Rule comment".to_string(),
            kind: ParamKind::String,
            required: true,
            description: String::new(),
            options: Vec::new(),
            visible_if: Some(VisibleIf {
                key: "match_by".to_string(),
                equals: "comment".to_string(),
            }),
        },
    ]
}

fn invalid(message: impl Into<String>) -> HubError {
    HubError::CapabilityInvalid(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    use routerhub_domain::device::DeviceView;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::String((*v).to_string())))
            .collect()
    }

    fn device_target(last_ip: Option<&str>) -> AutomationTarget {
        AutomationTarget::device(DeviceView {
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            name: "laptop".to_string(),
            vendor: String::new(),
            online: true,
            last_ip: last_ip.map(ToString::to_string),
            last_seen_at: None,
        })
    }

    #[test]
    fn should_resolve_device_ip_from_snapshot() {
        let target = device_target(Some(" 10.0.0.7 "));
        let address = resolve_target_address("device.ip", &Params::new(), &target).unwrap();
        assert_eq!(address, "10.0.0.7");
    }

    #[test]
    fn should_fail_when_device_ip_is_missing() {
        for last_ip in [None, Some(""), Some("   ")] {
            let target = device_target(last_ip);
            let err = resolve_target_address("device.ip", &Params::new(), &target).unwrap_err();
            assert!(err.to_string().contains("device IP is empty"));
        }
    }

    #[test]
    fn should_resolve_device_mac_from_snapshot() {
        let target = device_target(None);
        let address = resolve_target_address("device.mac", &Params::new(), &target).unwrap();
        assert_eq!(address, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn should_resolve_literal_ip_from_params() {
        let p = params(&[("literal_ip", "192.168.1.50")]);
        let address =
            resolve_target_address("literal_ip", &p, &AutomationTarget::global()).unwrap();
        assert_eq!(address, "192.168.1.50");
    }

    #[test]
    fn should_reject_device_targets_for_global_scope() {
        for target_kind in ["device.ip", "device.mac"] {
            let p = params(&[("target", target_kind)]);
            let err = validate_address_target(CapabilityScope::Global, &p).unwrap_err();
            assert!(err.to_string().contains("not available for global scope"));
        }
    }

    #[test]
    fn should_reject_global_literal_with_device_placeholder() {
        let p = params(&[("target", "literal_ip"), ("literal_ip", "{{device.ip}}")]);
        let err = validate_address_target(CapabilityScope::Global, &p).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn should_accept_device_targets_for_device_scope() {
        let p = params(&[("target", "device.ip")]);
        assert!(validate_address_target(CapabilityScope::Device, &p).is_ok());
    }

    #[test]
    fn should_reject_unknown_firewall_table() {
        let p = params(&[("table", "bridge")]);
        assert!(validate_firewall_table(&p).is_err());
    }

    #[test]
    fn should_require_rule_id_when_matching_by_id() {
        let p = params(&[("match_by", "id")]);
        assert!(validate_firewall_match(CapabilityScope::Device, &p).is_err());
    }

    #[test]
    fn should_reject_unknown_match_by() {
        let p = params(&[("match_by", "name")]);
        assert!(validate_firewall_match(CapabilityScope::Device, &p).is_err());
    }
}
