//! # bmshub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** for the collaborators the core talks to:
//!   - `RemoteGateway`: RPC-shaped control and status endpoints
//!   - `WorkspaceContext`: the active workspace id
//!   - `Notifier`: user-visible notification sink
//!   - `DeviceCache`: invalidation of the cached device list
//!   - `PlatformProbe` / `PlatformConfigRepository`: credential checks and
//!     persistence of the active platform configuration
//! - Provide the **use-cases**:
//!   - `CommandDispatcher`: one generic dispatcher for every integration
//!   - `SyncScheduler`: drop-if-busy status polling loop
//!   - `PlatformConfigService`: validate/save a platform credential
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (notification bus, device cache, workspace context, the `SyncControl`
//!   switches that drive the sync loops at runtime)
//!
//! ## Dependency rule
//! Depends on `bmshub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod device_cache;
pub mod dispatcher;
pub mod notification_bus;
pub mod ports;
pub mod services;
pub mod sync_control;
pub mod sync_scheduler;
pub mod workspace;

#[cfg(test)]
mod test_support;
