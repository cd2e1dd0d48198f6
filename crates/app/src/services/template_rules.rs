//! Template normalization and validation.
//!
//! Both run on every template write. Normalization canonicalizes what the
//! author typed (trimmed strings, defaulted switch options); validation
//! then rejects anything the engine could not execute, including params the
//! registered action and state-source implementations refuse.

use std::sync::LazyLock;

use regex::Regex;

use routerhub_domain::capability::{
    AutomationTarget, CapabilityControlOption, CapabilityScope, CapabilityTemplate, ControlType,
};
use routerhub_domain::error::HubError;

use crate::registry::Registry;

/// Dotted lowercase identifier, at least two segments: `routing.vpn`,
/// `net.block_internet`.
static TEMPLATE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(\.[a-z0-9_]+)+$").expect("valid pattern"));

/// Canonicalize an author-supplied template in place.
pub fn normalize_template(template: &mut CapabilityTemplate) {
    trim(&mut template.id);
    trim(&mut template.label);
    trim(&mut template.description);
    trim(&mut template.category);
    trim(&mut template.default_state);

    for option in &mut template.control.options {
        trim(&mut option.value);
        trim(&mut option.label);
    }
    if template.control.control_type == ControlType::Switch && template.control.options.is_empty() {
        template.control.options = vec![
            CapabilityControlOption {
                value: "on".to_string(),
                label: "On".to_string(),
            },
            CapabilityControlOption {
                value: "off".to_string(),
                label: "Off".to_string(),
            },
        ];
    }

    let states = std::mem::take(&mut template.states);
    template.states = states
        .into_iter()
        .map(|(name, mut config)| {
            trim(&mut config.label);
            for action in &mut config.actions_on_enter {
                trim(&mut action.id);
                trim(&mut action.type_id);
            }
            (name.trim().to_string(), config)
        })
        .collect();

    if let Some(sync) = &mut template.sync {
        trim(&mut sync.source.type_id);
        trim(&mut sync.mapping.when_true);
        trim(&mut sync.mapping.when_false);
    }
    trim(&mut template.ha_expose.entity_type);
    trim(&mut template.ha_expose.entity_suffix);
    trim(&mut template.ha_expose.name_template);
}

/// Validate a (normalized) template against structural rules and the
/// installed registry.
///
/// # Errors
///
/// Returns [`HubError::CapabilityInvalid`] describing the first violation.
pub fn validate_template(template: &CapabilityTemplate, registry: &Registry) -> Result<(), HubError> {
    if !TEMPLATE_ID.is_match(&template.id) {
        return Err(invalid(format!(
            "id {:?} must be dotted lowercase (e.g. \"routing.vpn\")",
            template.id
        )));
    }
    if template.label.is_empty() {
        return Err(invalid("label is required"));
    }
    if template.states.is_empty() {
        return Err(invalid("at least one state is required"));
    }
    if template.default_state.is_empty() {
        return Err(invalid("default_state is required"));
    }
    if !template.has_state(&template.default_state) {
        return Err(invalid(format!(
            "default_state {:?} is not a declared state",
            template.default_state
        )));
    }

    validate_control(template)?;
    validate_actions(template, registry)?;
    validate_sync(template, registry)?;
    validate_ha_expose(template)?;
    Ok(())
}

fn validate_control(template: &CapabilityTemplate) -> Result<(), HubError> {
    let options = &template.control.options;
    match template.control.control_type {
        ControlType::Switch => {
            let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            if values.len() != 2 || !values.contains(&"on") || !values.contains(&"off") {
                return Err(invalid(
                    "switch control must declare exactly the options \"on\" and \"off\"",
                ));
            }
        }
        ControlType::Select => {
            if options.len() < 2 {
                return Err(invalid("select control needs at least two options"));
            }
            let mut seen = std::collections::HashSet::new();
            for option in options {
                if option.value.is_empty() {
                    return Err(invalid("select option values must not be empty"));
                }
                if !seen.insert(option.value.as_str()) {
                    return Err(invalid(format!(
                        "select option {:?} is declared twice",
                        option.value
                    )));
                }
            }
        }
    }
    for option in options {
        if !template.has_state(&option.value) {
            return Err(invalid(format!(
                "control option {:?} is not a declared state",
                option.value
            )));
        }
    }
    Ok(())
}

fn validate_actions(template: &CapabilityTemplate, registry: &Registry) -> Result<(), HubError> {
    // Params are checked against the scope only; no device exists yet at
    // template-write time.
    let target = representative_target(template.scope);
    for (state_name, state) in &template.states {
        for instance in &state.actions_on_enter {
            if instance.type_id.is_empty() {
                return Err(invalid(format!(
                    "state {state_name:?}: action type is required"
                )));
            }
            let Some(action) = registry.action(&instance.type_id) else {
                return Err(invalid(format!(
                    "state {state_name:?}: action type {:?} is not registered",
                    instance.type_id
                )));
            };
            action.validate(&target, &instance.params).map_err(|err| {
                invalid(format!(
                    "state {state_name:?}: action {:?}: {err}",
                    instance.type_id
                ))
            })?;
        }
    }
    Ok(())
}

fn validate_sync(template: &CapabilityTemplate, registry: &Registry) -> Result<(), HubError> {
    let Some(sync) = &template.sync else {
        return Ok(());
    };
    if !sync.enabled {
        return Ok(());
    }
    if sync.source.type_id.is_empty() {
        return Err(invalid("sync: source type is required"));
    }
    let Some(source) = registry.state_source(&sync.source.type_id) else {
        return Err(invalid(format!(
            "sync: source type {:?} is not registered",
            sync.source.type_id
        )));
    };
    let target = representative_target(template.scope);
    source
        .validate(&target, &sync.source.params)
        .map_err(|err| invalid(format!("sync: source: {err}")))?;
    for state in [&sync.mapping.when_true, &sync.mapping.when_false] {
        if !state.is_empty() && !template.has_state(state) {
            return Err(invalid(format!(
                "sync: mapped state {state:?} is not a declared state"
            )));
        }
    }
    Ok(())
}

fn validate_ha_expose(template: &CapabilityTemplate) -> Result<(), HubError> {
    let ha = &template.ha_expose;
    if !ha.enabled {
        return Ok(());
    }
    if ha.entity_type != "switch" && ha.entity_type != "select" {
        return Err(invalid(format!(
            "ha_expose: entity_type {:?} must be \"switch\" or \"select\"",
            ha.entity_type
        )));
    }
    if ha.entity_suffix.is_empty() {
        return Err(invalid("ha_expose: entity_suffix is required"));
    }
    Ok(())
}

fn representative_target(scope: CapabilityScope) -> AutomationTarget {
    match scope {
        CapabilityScope::Global => AutomationTarget::global(),
        CapabilityScope::Device => AutomationTarget {
            scope: CapabilityScope::Device,
            device: None,
        },
    }
}

fn invalid(message: impl Into<String>) -> HubError {
    HubError::CapabilityInvalid(message.into())
}

fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
