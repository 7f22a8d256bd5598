//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use bmshub_domain::error::BmsError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps failures to an HTTP response with appropriate status code.
pub enum ApiError {
    /// An application error.
    Domain(BmsError),
    /// The request body could not be read as JSON.
    MalformedBody(JsonRejection),
}

impl From<BmsError> for ApiError {
    fn from(err: BmsError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MalformedBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Self::Domain(BmsError::Validation(err)) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Domain(BmsError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(BmsError::Credential(err)) => (StatusCode::UNAUTHORIZED, err.to_string()),
            Self::Domain(BmsError::Gateway(err)) => {
                tracing::error!(error = %err, "platform request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("platform request failed: {err}"),
                )
            }
            Self::Domain(BmsError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
