//! Port definitions — traits that adapters and collaborators implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod automation;
pub mod capability_repo;
pub mod device_provider;
pub mod router;

pub use automation::{
    Action, ActionExecutionContext, ActionMetadata, StateSource, StateSourceContext,
    StateSourceMetadata,
};
pub use capability_repo::CapabilityRepository;
pub use device_provider::DeviceProvider;
pub use router::{RouterActionClient, RouterClient, RouterConfigProvider, RouterStateClient};
