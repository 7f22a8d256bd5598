//! Shared application state for axum handlers.

use std::sync::Arc;

use bmshub_app::dispatcher::CommandDispatcher;
use bmshub_app::notification_bus::InProcessNotificationBus;
use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};
use bmshub_app::services::platform_config_service::PlatformConfigService;
use bmshub_app::sync_control::SyncControl;
use bmshub_app::workspace::WatchedWorkspace;
use bmshub_domain::integration::{Brise, SmartThings};

/// Dispatcher for integration `I` as wired behind the HTTP API.
pub type Dispatcher<I, G> =
    CommandDispatcher<I, G, WatchedWorkspace, Arc<InProcessNotificationBus>>;

/// Application state shared across all axum handlers.
///
/// Generic over the probe, repository and gateway types to avoid dynamic
/// dispatch. `Clone` is implemented manually so those types do not need to
/// be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<P, R, G> {
    /// Validates and persists the platform credential.
    pub platform_config_service: Arc<PlatformConfigService<P, R>>,
    /// BRISE command dispatcher.
    pub brise: Arc<Dispatcher<Brise, G>>,
    /// SmartThings command dispatcher.
    pub smartthings: Arc<Dispatcher<SmartThings, G>>,
    /// Workspace and polling switches.
    pub sync: Arc<SyncControl>,
    /// Failure notifications emitted by the dispatchers.
    pub notifications: Arc<InProcessNotificationBus>,
}

impl<P, R, G> Clone for AppState<P, R, G> {
    fn clone(&self) -> Self {
        Self {
            platform_config_service: Arc::clone(&self.platform_config_service),
            brise: Arc::clone(&self.brise),
            smartthings: Arc::clone(&self.smartthings),
            sync: Arc::clone(&self.sync),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

impl<P, R, G> AppState<P, R, G>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Clone + Send + Sync + 'static,
{
    /// Create the state, building one dispatcher per integration over `gateway`.
    ///
    /// Both dispatchers follow the workspace selected through `sync` and
    /// report failures on `notifications`.
    pub fn new(
        platform_config_service: PlatformConfigService<P, R>,
        gateway: G,
        sync: Arc<SyncControl>,
        notifications: Arc<InProcessNotificationBus>,
    ) -> Self {
        let brise =
            CommandDispatcher::new(gateway.clone(), sync.workspace(), Arc::clone(&notifications));
        let smartthings =
            CommandDispatcher::new(gateway, sync.workspace(), Arc::clone(&notifications));
        Self {
            platform_config_service: Arc::new(platform_config_service),
            brise: Arc::new(brise),
            smartthings: Arc::new(smartthings),
            sync,
            notifications,
        }
    }
}
