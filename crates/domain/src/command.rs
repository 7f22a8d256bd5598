//! Command: the wire payload of one control request and its outcome.

use serde::{Deserialize, Serialize};

use crate::action::{ActionValue, DeviceAction};
use crate::error::GatewayError;
use crate::id::{DeviceId, WorkspaceId};

/// Body posted to an integration's control endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest<A> {
    pub device_id: DeviceId,
    pub action: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ActionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_minutes: Option<u32>,
    pub workspace_id: WorkspaceId,
}

impl<A: DeviceAction> CommandRequest<A> {
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        device_id: DeviceId,
        action: A,
        value: Option<ActionValue>,
        timer_minutes: Option<u32>,
    ) -> Self {
        Self {
            device_id,
            action,
            value,
            timer_minutes,
            workspace_id,
        }
    }
}

/// Body returned by a control endpoint.
///
/// An empty body and `{}` both decode to the default (success).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ControlResponse {
    #[serde(default)]
    pub error: Option<String>,
}

impl ControlResponse {
    /// Turn an application-level `error` field into a [`GatewayError::Remote`].
    ///
    /// An empty error string counts as no error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Remote`] when the response reports a failure.
    pub fn into_result(self) -> Result<(), GatewayError> {
        match self.error {
            Some(message) if !message.is_empty() => Err(GatewayError::Remote { message }),
            _ => Ok(()),
        }
    }
}

/// Normalised outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}
