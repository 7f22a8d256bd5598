//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod commands;
pub mod notifications;
#[allow(clippy::missing_errors_doc)]
pub mod platform_config;
#[allow(clippy::missing_errors_doc)]
pub mod sync;

use axum::Router;
use axum::routing::{get, post, put};

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<P, R, G>() -> Router<AppState<P, R, G>>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/platform-config",
            post(platform_config::submit).get(platform_config::active),
        )
        .route("/brise/devices/{device_id}/commands", post(commands::brise))
        .route("/smartthings/devices/{device_id}/commands", post(commands::smartthings))
        .route("/sync", get(sync::current))
        .route("/sync/workspace", put(sync::select_workspace))
        .route("/sync/enabled", put(sync::set_enabled))
        .route("/notifications/stream", get(notifications::stream))
}
