//! Recording fakes shared by the use-case tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bmshub_domain::action::DeviceAction;
use bmshub_domain::command::{CommandRequest, ControlResponse};
use bmshub_domain::error::GatewayError;
use bmshub_domain::id::WorkspaceId;
use bmshub_domain::notification::Notification;
use bmshub_domain::status::{StatusRequest, SyncStatusResponse};

use crate::ports::{DeviceCache, Notifier, RemoteGateway, WorkspaceContext};

/// Gateway that records every request and replays a scripted outcome.
pub(crate) struct FakeGateway {
    control_requests: Mutex<Vec<(&'static str, serde_json::Value)>>,
    control_outcome: Mutex<Result<ControlResponse, GatewayError>>,
    status_requests: Mutex<Vec<(&'static str, String)>>,
    status_outcome: Mutex<Result<SyncStatusResponse, GatewayError>>,
    status_delay: Mutex<Duration>,
    status_started: AtomicUsize,
    status_finished: AtomicUsize,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            control_requests: Mutex::new(Vec::new()),
            control_outcome: Mutex::new(Ok(ControlResponse::default())),
            status_requests: Mutex::new(Vec::new()),
            status_outcome: Mutex::new(Ok(SyncStatusResponse::default())),
            status_delay: Mutex::new(Duration::ZERO),
            status_started: AtomicUsize::new(0),
            status_finished: AtomicUsize::new(0),
        }
    }
}

impl FakeGateway {
    pub(crate) fn set_control_outcome(&self, outcome: Result<ControlResponse, GatewayError>) {
        *self.control_outcome.lock().unwrap() = outcome;
    }

    pub(crate) fn set_status_outcome(&self, outcome: Result<SyncStatusResponse, GatewayError>) {
        *self.status_outcome.lock().unwrap() = outcome;
    }

    pub(crate) fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub(crate) fn control_requests(&self) -> Vec<(&'static str, serde_json::Value)> {
        self.control_requests.lock().unwrap().clone()
    }

    pub(crate) fn status_requests(&self) -> Vec<(&'static str, String)> {
        self.status_requests.lock().unwrap().clone()
    }

    pub(crate) fn status_started(&self) -> usize {
        self.status_started.load(Ordering::SeqCst)
    }

    pub(crate) fn status_finished(&self) -> usize {
        self.status_finished.load(Ordering::SeqCst)
    }
}

impl RemoteGateway for FakeGateway {
    async fn invoke_control<A: DeviceAction>(
        &self,
        endpoint: &'static str,
        request: &CommandRequest<A>,
    ) -> Result<ControlResponse, GatewayError> {
        let body = serde_json::to_value(request).unwrap();
        self.control_requests.lock().unwrap().push((endpoint, body));
        self.control_outcome.lock().unwrap().clone()
    }

    async fn fetch_status(
        &self,
        endpoint: &'static str,
        request: &StatusRequest,
    ) -> Result<SyncStatusResponse, GatewayError> {
        self.status_requests
            .lock()
            .unwrap()
            .push((endpoint, request.workspace_id.to_string()));
        self.status_started.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.status_finished.fetch_add(1, Ordering::SeqCst);
        self.status_outcome.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub(crate) struct RecordingCache {
    invalidated: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub(crate) fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }
}

impl DeviceCache for RecordingCache {
    fn invalidate(&self, key: &str) {
        self.invalidated.lock().unwrap().push(key.to_string());
    }
}

/// A workspace that never changes.
#[derive(Debug, Clone)]
pub(crate) struct StaticWorkspace(Option<WorkspaceId>);

impl StaticWorkspace {
    pub(crate) fn new(workspace_id: Option<WorkspaceId>) -> Self {
        Self(workspace_id)
    }
}

impl WorkspaceContext for StaticWorkspace {
    fn current_workspace_id(&self) -> Option<WorkspaceId> {
        self.0.clone()
    }
}
