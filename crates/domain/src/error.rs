//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BmsError`]
//! via `#[from]`. There are no stringly-typed catch-all variants.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BmsError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("remote gateway error")]
    Gateway(#[from] GatewayError),

    #[error("credential error")]
    Credential(#[from] CredentialError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("workspace id must not be empty")]
    EmptyWorkspaceId,

    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("access token must not be empty")]
    EmptyToken,

    #[error("unknown action {0:?}")]
    UnknownAction(String),
}

/// A looked-up record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure talking to a remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, TLS…).
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("endpoint returned HTTP {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// No response arrived within the configured deadline.
    #[error("request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    /// The response body could not be decoded.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// Transport succeeded but the payload carries an `error` field.
    #[error("remote error: {message}")]
    Remote { message: String },
}

impl GatewayError {
    /// Message reported by the remote side, if it sent one.
    ///
    /// Local failures (timeouts, connection errors, undecodable bodies)
    /// have no remote message and callers fall back to a generic text.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote { message } => Some(message),
            Self::Status {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// The device platform refused a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("the platform rejected the access token")]
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_remote_message_for_application_errors() {
        let err = GatewayError::Remote {
            message: "device offline".to_string(),
        };
        assert_eq!(err.remote_message(), Some("device offline"));
    }

    #[test]
    fn should_expose_status_body_message_when_present() {
        let err = GatewayError::Status {
            status: 502,
            message: Some("gateway unreachable".to_string()),
        };
        assert_eq!(err.remote_message(), Some("gateway unreachable"));
    }

    #[test]
    fn should_not_expose_message_for_local_failures() {
        assert!(GatewayError::Timeout { after_secs: 5 }.remote_message().is_none());
        assert!(
            GatewayError::Transport {
                message: "connection refused".to_string()
            }
            .remote_message()
            .is_none()
        );
    }

    #[test]
    fn should_convert_typed_errors_into_bms_error() {
        let err: BmsError = ValidationError::EmptyToken.into();
        assert!(matches!(err, BmsError::Validation(ValidationError::EmptyToken)));

        let err: BmsError = CredentialError::Rejected.into();
        assert!(matches!(err, BmsError::Credential(_)));
    }
}
