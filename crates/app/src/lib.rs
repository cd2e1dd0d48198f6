//! # routerhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters and collaborators implement:
//!   - `CapabilityRepository` — template CRUD + persisted capability state
//!   - `DeviceProvider` — read access to the device snapshot store
//!   - `RouterActionClient` / `RouterStateClient` — router side effects and reads
//!   - `RouterConfigProvider` — current add-on router configuration
//! - Define the pluggable **Action** / **StateSource** contracts and the
//!   write-once `Registry` that holds their implementations
//! - Provide the **CapabilityEngine** — state transitions (`set_capability_state`)
//!   and periodic reconciliation (`sync_once` / `run_sync_loop`)
//! - Provide the **CapabilityService** — template CRUD with validation plus
//!   the read models and patch operations the HTTP layer consumes
//!
//! ## Dependency rule
//! Depends on `routerhub-domain` only (plus `tokio::sync`/`tokio::time` for
//! the sync loop and timeouts). Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod engine;
pub mod ports;
pub mod registry;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
