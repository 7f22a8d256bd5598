//! Command dispatcher: turns a device intent into one remote control request.
//!
//! One generic [`CommandDispatcher`] serves every integration; the
//! integration marker type ([`Brise`], [`SmartThings`]) selects the endpoint
//! and the action vocabulary. Convenience methods for each vocabulary are
//! thin specialisations of [`send_command`](CommandDispatcher::send_command).

use std::marker::PhantomData;

use bmshub_domain::action::{ActionValue, BriseAction, DeviceAction, SmartThingsAction};
use bmshub_domain::command::{CommandRequest, CommandResult, ControlResponse};
use bmshub_domain::id::DeviceId;
use bmshub_domain::integration::{Brise, IntegrationKind, SmartThings};
use bmshub_domain::notification::Notification;

use crate::ports::{Notifier, RemoteGateway, WorkspaceContext};

/// Description used when the remote side gave no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

const NO_WORKSPACE_TITLE: &str = "No workspace selected";
const NO_WORKSPACE_DESCRIPTION: &str = "Select a workspace before controlling devices.";

/// Dispatches control commands for the integration `I`.
///
/// Every call performs at most one delivery attempt and emits at most one
/// notification. Failures never escape as `Err`: they are reported to the
/// [`Notifier`] and returned as a failed [`CommandResult`]. Success is silent.
pub struct CommandDispatcher<I, G, W, N> {
    gateway: G,
    workspace: W,
    notifier: N,
    integration: PhantomData<fn() -> I>,
}

/// Dispatcher for the BRISE HVAC gateway.
pub type BriseDispatcher<G, W, N> = CommandDispatcher<Brise, G, W, N>;

/// Dispatcher for the SmartThings hub.
pub type SmartThingsDispatcher<G, W, N> = CommandDispatcher<SmartThings, G, W, N>;

impl<I, G, W, N> CommandDispatcher<I, G, W, N>
where
    I: IntegrationKind,
    G: RemoteGateway + Send + Sync,
    W: WorkspaceContext + Send + Sync,
    N: Notifier + Send + Sync,
{
    pub fn new(gateway: G, workspace: W, notifier: N) -> Self {
        Self {
            gateway,
            workspace,
            notifier,
            integration: PhantomData,
        }
    }

    /// Send `action` to `device_id` in the current workspace.
    ///
    /// The only precondition is a selected workspace; without one the call
    /// short-circuits with one notification and no network I/O. Otherwise
    /// exactly one request is sent, whatever `value` and `timer_minutes` hold.
    /// Numeric strings are sent as numbers to verbs that take a number.
    #[tracing::instrument(
        skip(self, device_id, action, value),
        fields(integration = I::NAME, device_id = %device_id, action = %action)
    )]
    pub async fn send_command(
        &self,
        device_id: &DeviceId,
        action: I::Action,
        value: Option<ActionValue>,
        timer_minutes: Option<u32>,
    ) -> CommandResult {
        let Some(workspace_id) = self.workspace.current_workspace_id() else {
            tracing::warn!("no workspace selected, command not sent");
            return self.reject(NO_WORKSPACE_TITLE, NO_WORKSPACE_DESCRIPTION);
        };

        let request = CommandRequest::new(
            workspace_id,
            device_id.clone(),
            action,
            action.normalize_value(value),
            timer_minutes,
        );

        let outcome = self
            .gateway
            .invoke_control(I::CONTROL_ENDPOINT, &request)
            .await
            .and_then(ControlResponse::into_result);

        match outcome {
            Ok(()) => {
                tracing::debug!("command acknowledged");
                CommandResult::ok()
            }
            Err(err) => {
                tracing::warn!(error = %err, "command failed");
                let description = err.remote_message().unwrap_or(GENERIC_FAILURE);
                self.reject(&format!("{} command failed", I::NAME), description)
            }
        }
    }

    fn reject(&self, title: &str, description: &str) -> CommandResult {
        self.notifier
            .notify(Notification::destructive(title, description));
        CommandResult::failed(description)
    }

    /// Power the device on.
    pub async fn turn_on(&self, device_id: &DeviceId) -> CommandResult {
        self.send_command(device_id, I::Action::TURN_ON, None, None)
            .await
    }

    /// Power the device off.
    pub async fn turn_off(&self, device_id: &DeviceId) -> CommandResult {
        self.send_command(device_id, I::Action::TURN_OFF, None, None)
            .await
    }

    /// Set the target temperature in degrees.
    pub async fn set_temperature(
        &self,
        device_id: &DeviceId,
        degrees: impl Into<ActionValue>,
    ) -> CommandResult {
        self.send_command(
            device_id,
            I::Action::SET_TEMPERATURE,
            Some(degrees.into()),
            None,
        )
        .await
    }

    /// Switch the operating mode (`cool`, `heat`, …).
    pub async fn set_mode(&self, device_id: &DeviceId, mode: &str) -> CommandResult {
        self.send_command(device_id, I::Action::SET_MODE, Some(mode.into()), None)
            .await
    }
}

impl<G, W, N> CommandDispatcher<Brise, G, W, N>
where
    G: RemoteGateway + Send + Sync,
    W: WorkspaceContext + Send + Sync,
    N: Notifier + Send + Sync,
{
    /// Schedule `action_label` (e.g. `"off"`) to happen after `minutes`.
    pub async fn set_timer(
        &self,
        device_id: &DeviceId,
        action_label: &str,
        minutes: u32,
    ) -> CommandResult {
        self.send_command(
            device_id,
            BriseAction::SetTimer,
            Some(action_label.into()),
            Some(minutes),
        )
        .await
    }

    /// Cancel any pending timer.
    pub async fn cancel_timer(&self, device_id: &DeviceId) -> CommandResult {
        self.send_command(device_id, BriseAction::CancelTimer, None, None)
            .await
    }
}

impl<G, W, N> CommandDispatcher<SmartThings, G, W, N>
where
    G: RemoteGateway + Send + Sync,
    W: WorkspaceContext + Send + Sync,
    N: Notifier + Send + Sync,
{
    /// Set the fan speed (`auto`, `low`, `medium`, `high`, …).
    pub async fn set_fan_speed(&self, device_id: &DeviceId, speed: &str) -> CommandResult {
        self.send_command(
            device_id,
            SmartThingsAction::SetFanSpeed,
            Some(speed.into()),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bmshub_domain::error::GatewayError;
    use bmshub_domain::id::WorkspaceId;
    use bmshub_domain::notification::NotificationVariant;

    use crate::test_support::{FakeGateway, RecordingNotifier, StaticWorkspace};

    type Dispatcher<I> =
        CommandDispatcher<I, Arc<FakeGateway>, StaticWorkspace, Arc<RecordingNotifier>>;

    fn ws(id: &str) -> Option<WorkspaceId> {
        Some(WorkspaceId::new(id).unwrap())
    }

    fn device() -> DeviceId {
        DeviceId::new("ac-42").unwrap()
    }

    fn dispatcher<I: IntegrationKind>(
        workspace: StaticWorkspace,
        gateway: &Arc<FakeGateway>,
        notifier: &Arc<RecordingNotifier>,
    ) -> Dispatcher<I> {
        CommandDispatcher::new(Arc::clone(gateway), workspace, Arc::clone(notifier))
    }

    #[tokio::test]
    async fn should_post_set_temperature_and_stay_silent_on_success() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);

        let result = dispatcher.set_temperature(&device(), 22).await;

        assert!(result.is_success());
        assert!(notifier.notifications().is_empty());
        let requests = gateway.control_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "brise-control");
        assert_eq!(
            requests[0].1,
            serde_json::json!({
                "deviceId": "ac-42",
                "action": "setTemperature",
                "value": 22,
                "workspaceId": "ws-1",
            })
        );
    }

    #[tokio::test]
    async fn should_notify_with_remote_message_when_response_has_error() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.set_control_outcome(Ok(ControlResponse {
            error: Some("device offline".to_string()),
        }));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);

        let result = dispatcher.set_temperature(&device(), 22).await;

        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("device offline"));
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].description, "device offline");
        assert_eq!(notifications[0].variant, NotificationVariant::Destructive);
        assert_eq!(gateway.control_requests().len(), 1);
    }

    #[tokio::test]
    async fn should_use_generic_message_for_transport_failures() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.set_control_outcome(Err(GatewayError::Transport {
            message: "connection refused".to_string(),
        }));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher::<SmartThings>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);

        let result = dispatcher.turn_off(&device()).await;

        assert!(!result.is_success());
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].description, GENERIC_FAILURE);
        assert_eq!(notifications[0].title, "SmartThings command failed");
    }

    #[tokio::test]
    async fn should_prefer_error_body_of_failed_http_status() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.set_control_outcome(Err(GatewayError::Status {
            status: 500,
            message: Some("gateway unreachable".to_string()),
        }));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);

        let result = dispatcher.turn_on(&device()).await;

        assert_eq!(result.error.as_deref(), Some("gateway unreachable"));
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn should_not_touch_network_without_workspace() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(None), &gateway, &notifier);

        let result = dispatcher.turn_on(&device()).await;

        assert!(!result.is_success());
        assert!(gateway.control_requests().is_empty());
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, NO_WORKSPACE_TITLE);
    }

    #[tokio::test]
    async fn should_send_every_action_whatever_its_value() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let brise = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);
        let smartthings =
            dispatcher::<SmartThings>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);
        let values = [None, Some(ActionValue::from("off")), Some(ActionValue::from(2))];
        let device = device();

        for value in &values {
            for action in BriseAction::ALL {
                let result = brise
                    .send_command(&device, *action, value.clone(), None)
                    .await;
                assert!(result.is_success(), "{action} with {value:?}");
            }
            for action in SmartThingsAction::ALL {
                let result = smartthings
                    .send_command(&device, *action, value.clone(), None)
                    .await;
                assert!(result.is_success(), "{action} with {value:?}");
            }
        }

        let sent = values.len() * (BriseAction::ALL.len() + SmartThingsAction::ALL.len());
        assert_eq!(gateway.control_requests().len(), sent);
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn should_forward_values_the_verb_does_not_usually_take() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);
        let device = device();

        dispatcher
            .send_command(&device, BriseAction::SetTemperature, Some("22".into()), None)
            .await;
        dispatcher
            .send_command(&device, BriseAction::SetTimer, Some("off".into()), None)
            .await;
        dispatcher
            .send_command(&device, BriseAction::SetMode, Some(2.into()), None)
            .await;

        let bodies: Vec<serde_json::Value> = gateway
            .control_requests()
            .into_iter()
            .map(|(_, body)| body)
            .collect();
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0]["value"], 22);
        assert_eq!(bodies[1]["value"], "off");
        assert!(bodies[1].get("timerMinutes").is_none());
        assert_eq!(bodies[2]["value"], 2);
    }

    #[tokio::test]
    async fn should_send_exactly_one_request_per_valid_brise_action() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);
        let device = device();

        assert!(dispatcher.turn_on(&device).await.is_success());
        assert!(dispatcher.turn_off(&device).await.is_success());
        assert!(dispatcher.set_temperature(&device, 21.5).await.is_success());
        assert!(dispatcher.set_mode(&device, "cool").await.is_success());
        assert!(dispatcher.set_timer(&device, "off", 90).await.is_success());
        assert!(dispatcher.cancel_timer(&device).await.is_success());

        let actions: Vec<String> = gateway
            .control_requests()
            .iter()
            .map(|(_, body)| body["action"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            actions,
            [
                "turnOn",
                "turnOff",
                "setTemperature",
                "setMode",
                "setTimer",
                "cancelTimer"
            ]
        );
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn should_carry_timer_minutes_for_brise_timer() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher::<Brise>(StaticWorkspace::new(ws("ws-1")), &gateway, &notifier);

        dispatcher.set_timer(&device(), "off", 45).await;

        let requests = gateway.control_requests();
        assert_eq!(requests[0].1["value"], "off");
        assert_eq!(requests[0].1["timerMinutes"], 45);
    }

    #[tokio::test]
    async fn should_send_fan_speed_to_smartthings_endpoint() {
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher::<SmartThings>(StaticWorkspace::new(ws("ws-7")), &gateway, &notifier);

        let result = dispatcher.set_fan_speed(&device(), "high").await;

        assert!(result.is_success());
        let requests = gateway.control_requests();
        assert_eq!(requests[0].0, "smartthings-control");
        assert_eq!(
            requests[0].1,
            serde_json::json!({
                "deviceId": "ac-42",
                "action": "setFanSpeed",
                "value": "high",
                "workspaceId": "ws-7",
            })
        );
    }
}
