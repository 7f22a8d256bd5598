//! `/api/platform-config`: validate or save the SmartThings access token.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};
use bmshub_domain::error::{BmsError, ValidationError};
use bmshub_domain::platform_config::{Location, PlatformConfig};
use bmshub_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body of `POST /api/platform-config`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub action: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub location_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidatedBody {
    pub success: bool,
    pub message: String,
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
pub struct SavedBody {
    pub success: bool,
    pub message: String,
}

/// The active configuration as shown to clients. The token is masked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBody {
    pub id: String,
    pub access_token: String,
    pub location_id: Option<String>,
    pub updated_at: Timestamp,
}

impl From<PlatformConfig> for ActiveBody {
    fn from(config: PlatformConfig) -> Self {
        Self {
            id: config.id.to_string(),
            access_token: config.access_token.masked(),
            location_id: config.location_id,
            updated_at: config.updated_at,
        }
    }
}

/// Possible responses from the submit endpoint.
pub enum SubmitResponse {
    Validated(Json<ValidatedBody>),
    Saved(Json<SavedBody>),
}

impl IntoResponse for SubmitResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Validated(json) => json.into_response(),
            Self::Saved(json) => json.into_response(),
        }
    }
}

/// Possible responses from the active endpoint.
pub enum ActiveResponse {
    Ok(Json<ActiveBody>),
}

impl IntoResponse for ActiveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/platform-config`
pub async fn submit<P, R, G>(
    State(state): State<AppState<P, R, G>>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<SubmitResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    let Json(req) = body?;
    let service = &state.platform_config_service;

    match req.action.as_str() {
        "validate" => {
            let locations = service.validate(&req.token).await?;
            let message = format!("Token is valid. {} location(s) found.", locations.len());
            Ok(SubmitResponse::Validated(Json(ValidatedBody {
                success: true,
                message,
                locations,
            })))
        }
        "save" => {
            service.save(&req.token, req.location_id).await?;
            Ok(SubmitResponse::Saved(Json(SavedBody {
                success: true,
                message: "SmartThings configuration saved.".to_string(),
            })))
        }
        other => Err(BmsError::from(ValidationError::UnknownAction(other.to_string())).into()),
    }
}

/// `GET /api/platform-config`
pub async fn active<P, R, G>(
    State(state): State<AppState<P, R, G>>,
) -> Result<ActiveResponse, ApiError>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    let config = state.platform_config_service.active().await?;
    Ok(ActiveResponse::Ok(Json(config.into())))
}
