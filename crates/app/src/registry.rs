//! Action / state-source registry.
//!
//! A process-wide, write-once-at-startup table mapping string type-IDs to
//! pluggable behaviors. The registry performs no validation itself — that
//! is each behavior's own responsibility — and holds no per-request state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ports::automation::{Action, ActionMetadata, StateSource, StateSourceMetadata};

/// Lookup table for registered actions and state sources.
#[derive(Default)]
pub struct Registry {
    actions: HashMap<String, Arc<dyn Action>>,
    state_sources: HashMap<String, Arc<dyn StateSource>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an action implementation, keyed by its own reported ID.
    pub fn register_action(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.id().to_string(), action);
    }

    /// Install a state-source implementation, keyed by its own reported ID.
    pub fn register_state_source(&mut self, source: Arc<dyn StateSource>) {
        self.state_sources.insert(source.id().to_string(), source);
    }

    /// Look up a registered action by ID.
    #[must_use]
    pub fn action(&self, id: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(id).cloned()
    }

    /// Look up a registered state source by ID.
    #[must_use]
    pub fn state_source(&self, id: &str) -> Option<Arc<dyn StateSource>> {
        self.state_sources.get(id).cloned()
    }

    /// Metadata of every registered action, sorted by ID for stable listings.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionMetadata> {
        let mut out: Vec<ActionMetadata> =
            self.actions.values().map(|action| action.metadata()).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Metadata of every registered state source, sorted by ID.
    #[must_use]
    pub fn state_source_types(&self) -> Vec<StateSourceMetadata> {
        let mut out: Vec<StateSourceMetadata> = self
            .state_sources
            .values()
            .map(|source| source.metadata())
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}
