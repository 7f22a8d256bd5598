//! `/api/sync`: inspect and flip the switches driving the status sync loops.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};
use bmshub_app::sync_control::SyncControlState;
use bmshub_domain::id::WorkspaceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Current switches as shown to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBody {
    pub workspace_id: Option<WorkspaceId>,
    pub enabled: bool,
}

impl From<SyncControlState> for SyncBody {
    fn from(state: SyncControlState) -> Self {
        Self {
            workspace_id: state.workspace_id,
            enabled: state.enabled,
        }
    }
}

/// Request body of `PUT /api/sync/workspace`. `null` clears the selection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWorkspaceRequest {
    pub workspace_id: Option<WorkspaceId>,
}

/// Request body of `PUT /api/sync/enabled`.
#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Possible responses from the sync endpoints.
pub enum SyncResponse {
    Ok(Json<SyncBody>),
}

impl IntoResponse for SyncResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/sync`
pub async fn current<P, R, G>(State(state): State<AppState<P, R, G>>) -> SyncResponse
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    SyncResponse::Ok(Json(state.sync.state().into()))
}

/// `PUT /api/sync/workspace`
pub async fn select_workspace<P, R, G>(
    State(state): State<AppState<P, R, G>>,
    body: Result<Json<SelectWorkspaceRequest>, JsonRejection>,
) -> Result<SyncResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    let Json(req) = body?;
    state.sync.select_workspace(req.workspace_id);
    Ok(SyncResponse::Ok(Json(state.sync.state().into())))
}

/// `PUT /api/sync/enabled`
pub async fn set_enabled<P, R, G>(
    State(state): State<AppState<P, R, G>>,
    body: Result<Json<SetEnabledRequest>, JsonRejection>,
) -> Result<SyncResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    let Json(req) = body?;
    state.sync.set_enabled(req.enabled);
    Ok(SyncResponse::Ok(Json(state.sync.state().into())))
}
