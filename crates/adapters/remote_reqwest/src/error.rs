//! Adapter errors and the mapping of reqwest failures into domain errors.

use std::time::Duration;

use serde::Deserialize;

use bmshub_domain::error::{BmsError, GatewayError};

/// Failures building a client. Request-time failures are [`GatewayError`]s.
#[derive(Debug, thiserror::Error)]
pub enum ReqwestGatewayError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid API key header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<ReqwestGatewayError> for BmsError {
    fn from(err: ReqwestGatewayError) -> Self {
        Self::Gateway(GatewayError::Transport {
            message: err.to_string(),
        })
    }
}

/// Error body shape shared by the remote functions.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Map a reqwest failure, reporting `timeout` as the deadline that expired.
pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout {
            after_secs: timeout.as_secs(),
        }
    } else if err.is_decode() {
        GatewayError::Decode {
            message: err.to_string(),
        }
    } else {
        GatewayError::Transport {
            message: err.to_string(),
        }
    }
}

/// Build the error for a non-2xx reply, keeping a JSON `error` field if any.
pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty());
    GatewayError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_error_field_of_failed_reply() {
        let err = from_status(
            reqwest::StatusCode::BAD_GATEWAY,
            r#"{"error":"gateway unreachable"}"#,
        );
        assert_eq!(
            err,
            GatewayError::Status {
                status: 502,
                message: Some("gateway unreachable".to_string()),
            }
        );
    }

    #[test]
    fn should_ignore_non_json_error_body() {
        let err = from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.remote_message(), None);
    }
}
