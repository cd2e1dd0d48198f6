//! # routerhub-domain
//!
//! Pure domain model for the routerhub capability automation system.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, identifier normalization
//! - Define **Capability templates** (declarative state machines bound to actions)
//! - Define **Targets** (the device, or the global singleton, an action runs against)
//! - Define **Persisted capability state** (per-device and global records)
//! - Define **Parameter schemas** (UI-facing metadata for pluggable behaviors)
//! - Define the **Router config** payload handed to router-facing collaborators
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod capability;
pub mod device;
pub mod router;
