//! `/api/{integration}/devices/{device_id}/commands`: send one device command.
//!
//! The response is always the dispatcher's [`CommandResult`]; a command that
//! did not happen (no workspace, remote error) is reported with
//! `success: false` and the same message the notification carried.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};
use bmshub_domain::action::{ActionValue, DeviceAction};
use bmshub_domain::command::CommandResult;
use bmshub_domain::error::BmsError;
use bmshub_domain::id::DeviceId;
use bmshub_domain::integration::IntegrationKind;

use crate::error::ApiError;
use crate::state::{AppState, Dispatcher};

/// Request body of a command.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCommandRequest {
    pub action: String,
    #[serde(default)]
    pub value: Option<ActionValue>,
    #[serde(default)]
    pub timer_minutes: Option<u32>,
}

/// Possible responses from the command endpoints.
pub enum CommandResponse {
    Dispatched(Json<CommandResult>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Dispatched(json) => json.into_response(),
        }
    }
}

async fn dispatch<I, G>(
    dispatcher: &Dispatcher<I, G>,
    device_id: String,
    body: Result<Json<SendCommandRequest>, JsonRejection>,
) -> Result<CommandResponse, ApiError>
where
    I: IntegrationKind,
    G: RemoteGateway + Send + Sync,
{
    let Json(req) = body?;
    let device_id = DeviceId::new(device_id).map_err(BmsError::from)?;
    let action = <I::Action as DeviceAction>::parse(&req.action).map_err(BmsError::from)?;

    let result = dispatcher
        .send_command(&device_id, action, req.value, req.timer_minutes)
        .await;
    Ok(CommandResponse::Dispatched(Json(result)))
}

/// `POST /api/brise/devices/{device_id}/commands`
pub async fn brise<P, R, G>(
    State(state): State<AppState<P, R, G>>,
    Path(device_id): Path<String>,
    body: Result<Json<SendCommandRequest>, JsonRejection>,
) -> Result<CommandResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    dispatch(&state.brise, device_id, body).await
}

/// `POST /api/smartthings/devices/{device_id}/commands`
pub async fn smartthings<P, R, G>(
    State(state): State<AppState<P, R, G>>,
    Path(device_id): Path<String>,
    body: Result<Json<SendCommandRequest>, JsonRejection>,
) -> Result<CommandResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    dispatch(&state.smartthings, device_id, body).await
}
