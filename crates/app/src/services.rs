//! Application services built on the engine and ports.

mod capability_service;
mod template_rules;

pub use capability_service::{CapabilityPatch, CapabilityService};
pub use template_rules::{normalize_template, validate_template};
