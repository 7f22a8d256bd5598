//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod collaborators;
pub mod platform;
pub mod remote_gateway;

pub use collaborators::{DeviceCache, Notifier, WorkspaceContext};
pub use platform::{PlatformConfigRepository, PlatformProbe};
pub use remote_gateway::RemoteGateway;
