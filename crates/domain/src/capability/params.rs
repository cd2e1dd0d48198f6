//! Parameter maps and UI-facing parameter schemas.
//!
//! Template authors configure actions generically, so parameters stay an
//! untyped key→value map at the boundary. Each concrete action or state
//! source is solely responsible for interpreting and validating its own
//! keys against the schema it declares in its metadata.

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Untyped action/state-source parameters.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// UI field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Plain text value.
    String,
    /// One-of string values.
    Enum,
    /// Boolean checkbox value.
    Bool,
}

/// Conditional field rendering rule: show the field only when another
/// parameter equals a given value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleIf {
    pub key: String,
    pub equals: String,
}

/// Describes one action/state-source parameter for UI forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamField {
    pub key: String,
    pub label: String,
    pub kind: ParamKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibleIf>,
}

/// Fetch a required, non-empty string parameter.
///
/// # Errors
///
/// Returns [`HubError::CapabilityInvalid`] when the key is missing, not a
/// string, or blank after trimming.
pub fn string_param(params: &Params, key: &str) -> Result<String, HubError> {
    let raw = params
        .get(key)
        .ok_or_else(|| HubError::CapabilityInvalid(format!("missing param {key:?}")))?;
    let value = raw
        .as_str()
        .ok_or_else(|| HubError::CapabilityInvalid(format!("param {key:?} must be string")))?
        .trim();
    if value.is_empty() {
        return Err(HubError::CapabilityInvalid(format!("param {key:?} is empty")));
    }
    Ok(value.to_string())
}

/// Whether a raw string looks like a `{{device.*}}` placeholder.
///
/// Placeholders are never substituted by the engine; they are only rejected
/// where no device exists to resolve them against (global scope).
#[must_use]
pub fn contains_device_placeholder(raw: &str) -> bool {
    raw.to_lowercase().contains("{{device.")
}
