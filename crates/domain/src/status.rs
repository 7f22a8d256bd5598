//! Status snapshots returned by the remote status endpoints.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, WorkspaceId};

/// Body posted to a status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub workspace_id: WorkspaceId,
}

/// Authoritative state of one device as last seen by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub device_id: DeviceId,
    #[serde(default)]
    pub is_on: bool,
    #[serde(default)]
    pub current_temp: Option<f64>,
    #[serde(default)]
    pub target_temp: Option<f64>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Only reported by SmartThings.
    #[serde(default)]
    pub fan_speed: Option<String>,
    #[serde(default)]
    pub is_online: bool,
}

/// Result of one sync cycle on the remote side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    #[serde(default)]
    pub statuses: Vec<DeviceStatus>,
    /// Number of devices whose state changed since the previous poll.
    #[serde(default)]
    pub updated: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncStatusResponse {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.updated > 0
    }

    /// Application-level error, ignoring empty strings.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}
