//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. A permissive [`CorsLayer`] answers
/// preflight `OPTIONS` requests, and a [`TraceLayer`] logs each HTTP
/// request/response at the `DEBUG` level.
pub fn build<P, R, G>(state: AppState<P, R, G>) -> Router
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
