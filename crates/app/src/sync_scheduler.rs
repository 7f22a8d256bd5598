//! Sync scheduler: periodic status polling with drop-if-busy overlap control.
//!
//! A [`SyncScheduler`] is either `Stopped` or `Running` with the handle of its
//! ticker task. Every tick spawns one [`poll`](SyncScheduler::poll); a poll
//! that finds another one still in flight returns immediately, so a slow
//! remote never causes requests to pile up.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use bmshub_domain::error::GatewayError;
use bmshub_domain::id::WorkspaceId;
use bmshub_domain::integration::IntegrationKind;
use bmshub_domain::status::{StatusRequest, SyncStatusResponse};

use crate::ports::{DeviceCache, RemoteGateway, WorkspaceContext};

/// Timing knobs of a [`SyncScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Time between two ticks.
    pub period: Duration,
    /// Upper bound on one status request. `None` waits for the transport.
    pub poll_timeout: Option<Duration>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(30),
            poll_timeout: Some(Duration::from_secs(25)),
        }
    }
}

enum SchedulerState {
    Stopped,
    Running { handle: JoinHandle<()> },
}

/// Holds the in-flight flag for as long as it lives.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Shared<I, G, W, C> {
    gateway: G,
    workspace: W,
    cache: C,
    settings: SyncSettings,
    in_flight: AtomicBool,
    integration: PhantomData<fn() -> I>,
}

impl<I, G, W, C> Shared<I, G, W, C>
where
    I: IntegrationKind,
    G: RemoteGateway + Send + Sync,
    W: WorkspaceContext + Send + Sync,
    C: DeviceCache + Send + Sync,
{
    async fn poll(&self) -> Option<SyncStatusResponse> {
        let Some(workspace_id) = self.workspace.current_workspace_id() else {
            tracing::debug!("no workspace selected, sync skipped");
            return None;
        };
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("previous sync still in flight, tick dropped");
            return None;
        };

        let request = StatusRequest { workspace_id };
        let call = self.gateway.fetch_status(I::STATUS_ENDPOINT, &request);
        let outcome = match self.settings.poll_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(GatewayError::Timeout {
                    after_secs: limit.as_secs(),
                })),
            None => call.await,
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "status sync failed");
                return None;
            }
        };
        if let Some(message) = response.error_message() {
            tracing::warn!(error = message, "status sync reported an error");
            return None;
        }

        if response.has_changes() {
            tracing::info!(updated = response.updated, "device status changed");
            self.cache.invalidate(I::DEVICE_LIST_KEY);
        } else {
            tracing::trace!("device status unchanged");
        }
        Some(response)
    }
}

/// Periodically pulls authoritative device status for integration `I`.
pub struct SyncScheduler<I, G, W, C> {
    shared: Arc<Shared<I, G, W, C>>,
    state: Mutex<SchedulerState>,
}

impl<I, G, W, C> SyncScheduler<I, G, W, C>
where
    I: IntegrationKind,
    G: RemoteGateway + Send + Sync + 'static,
    W: WorkspaceContext + Send + Sync + 'static,
    C: DeviceCache + Send + Sync + 'static,
{
    pub fn new(gateway: G, workspace: W, cache: C, settings: SyncSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                gateway,
                workspace,
                cache,
                settings,
                in_flight: AtomicBool::new(false),
                integration: PhantomData,
            }),
            state: Mutex::new(SchedulerState::Stopped),
        }
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start polling: one poll right away, then one per period.
    ///
    /// Calling `start` on a running scheduler replaces its loop; there is
    /// never more than one ticker per scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut state = self.state();
        if let SchedulerState::Running { handle } = &*state {
            handle.abort();
            tracing::debug!(integration = I::NAME, "sync loop restarted");
        }

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(shared.settings.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    shared.poll().await;
                });
            }
        });
        *state = SchedulerState::Running { handle };
        tracing::info!(
            integration = I::NAME,
            period_secs = self.shared.settings.period.as_secs(),
            "sync started"
        );
    }

    /// Stop ticking. A poll already in flight is left to finish.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.state(), SchedulerState::Stopped);
        if let SchedulerState::Running { handle } = previous {
            handle.abort();
            tracing::info!(integration = I::NAME, "sync stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.state(), SchedulerState::Running { .. })
    }

    /// Run one sync cycle now.
    ///
    /// Returns `None` when skipped (no workspace, or another poll in flight)
    /// or when the request failed; failures are logged, never surfaced.
    #[tracing::instrument(skip(self), fields(integration = I::NAME))]
    pub async fn poll(&self) -> Option<SyncStatusResponse> {
        self.shared.poll().await
    }

    /// (Re)start when `enabled` and a workspace is selected, stop otherwise.
    ///
    /// A running scheduler is restarted so the new conditions are polled
    /// right away.
    pub fn reconcile(&self, enabled: bool) {
        if enabled && self.shared.workspace.current_workspace_id().is_some() {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Keep the scheduler reconciled with both channels until either closes.
    ///
    /// The scheduler is stopped when the supervising task ends.
    pub fn supervise(
        self: Arc<Self>,
        mut enabled: watch::Receiver<bool>,
        mut workspace: watch::Receiver<Option<WorkspaceId>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let is_enabled = *enabled.borrow_and_update();
                drop(workspace.borrow_and_update());
                self.reconcile(is_enabled);

                let closed = tokio::select! {
                    changed = enabled.changed() => changed.is_err(),
                    changed = workspace.changed() => changed.is_err(),
                };
                if closed {
                    break;
                }
            }
            self.stop();
        })
    }
}

impl<I, G, W, C> Drop for SyncScheduler<I, G, W, C> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let SchedulerState::Running { handle } = state {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bmshub_domain::integration::{Brise, SmartThings};

    use crate::test_support::{FakeGateway, RecordingCache, StaticWorkspace};
    use crate::workspace::WatchedWorkspace;

    type Scheduler<I, W> = SyncScheduler<I, Arc<FakeGateway>, W, Arc<RecordingCache>>;

    fn ws(id: &str) -> Option<WorkspaceId> {
        Some(WorkspaceId::new(id).unwrap())
    }

    fn without_timeout() -> SyncSettings {
        SyncSettings {
            poll_timeout: None,
            ..SyncSettings::default()
        }
    }

    fn fixture<I: IntegrationKind>(
        workspace: Option<WorkspaceId>,
        settings: SyncSettings,
    ) -> (
        Scheduler<I, StaticWorkspace>,
        Arc<FakeGateway>,
        Arc<RecordingCache>,
    ) {
        let gateway = Arc::new(FakeGateway::default());
        let cache = Arc::new(RecordingCache::default());
        let scheduler = SyncScheduler::new(
            Arc::clone(&gateway),
            StaticWorkspace::new(workspace),
            Arc::clone(&cache),
            settings,
        );
        (scheduler, gateway, cache)
    }

    fn changed(updated: u32) -> SyncStatusResponse {
        SyncStatusResponse {
            updated,
            ..SyncStatusResponse::default()
        }
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[test]
    fn default_settings_poll_every_thirty_seconds() {
        let settings = SyncSettings::default();
        assert_eq!(settings.period, Duration::from_secs(30));
        assert!(settings.poll_timeout.unwrap() < settings.period);
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_immediately_then_every_period() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());

        scheduler.start();
        advance(1).await;
        assert_eq!(gateway.status_started(), 1);

        advance(60).await;
        assert_eq!(gateway.status_started(), 3);
        assert!(
            gateway
                .status_requests()
                .iter()
                .all(|(endpoint, workspace)| *endpoint == "brise-sync-status" && workspace == "ws-1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_single_timer_when_started_twice() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());

        scheduler.start();
        scheduler.start();
        advance(61).await;

        assert!(scheduler.is_running());
        assert_eq!(gateway.status_started(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stay_stopped_when_stopped_twice() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());

        scheduler.start();
        advance(1).await;
        scheduler.stop();
        scheduler.stop();
        advance(120).await;

        assert!(!scheduler.is_running());
        assert_eq!(gateway.status_started(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_drop_tick_while_previous_poll_is_in_flight() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        gateway.set_status_delay(Duration::from_secs(45));

        scheduler.start();
        advance(31).await;
        // Tick at 30s found the first poll still waiting on the network.
        assert_eq!(gateway.status_started(), 1);
        assert_eq!(gateway.status_finished(), 0);

        advance(15).await;
        assert_eq!(gateway.status_finished(), 1);
        assert_eq!(gateway.status_started(), 1);

        advance(15).await;
        assert_eq!(gateway.status_started(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_manual_poll_that_overlaps() {
        let (scheduler, gateway, _cache) = fixture::<SmartThings>(ws("ws-1"), without_timeout());
        gateway.set_status_delay(Duration::from_secs(5));

        let (first, second) = tokio::join!(scheduler.poll(), scheduler.poll());

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(gateway.status_started(), 1);
    }

    #[tokio::test]
    async fn should_invalidate_cache_once_when_devices_changed() {
        let (scheduler, gateway, cache) = fixture::<SmartThings>(ws("ws-1"), without_timeout());
        gateway.set_status_outcome(Ok(changed(3)));

        let response = scheduler.poll().await.unwrap();

        assert_eq!(response.updated, 3);
        assert_eq!(cache.invalidated(), ["smartthings-devices"]);
    }

    #[tokio::test]
    async fn should_not_invalidate_cache_when_nothing_changed() {
        let (scheduler, gateway, cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        gateway.set_status_outcome(Ok(changed(0)));

        let response = scheduler.poll().await;

        assert_eq!(response, Some(changed(0)));
        assert!(cache.invalidated().is_empty());
    }

    #[tokio::test]
    async fn should_release_guard_after_transport_error() {
        let (scheduler, gateway, cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        gateway.set_status_outcome(Err(GatewayError::Transport {
            message: "connection reset".to_string(),
        }));

        assert!(scheduler.poll().await.is_none());
        assert!(scheduler.poll().await.is_none());

        assert_eq!(gateway.status_started(), 2);
        assert!(cache.invalidated().is_empty());
    }

    #[tokio::test]
    async fn should_treat_application_error_as_no_data() {
        let (scheduler, gateway, cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        gateway.set_status_outcome(Ok(SyncStatusResponse {
            updated: 2,
            error: Some("gateway offline".to_string()),
            ..SyncStatusResponse::default()
        }));

        assert!(scheduler.poll().await.is_none());
        assert!(cache.invalidated().is_empty());
    }

    #[tokio::test]
    async fn should_skip_poll_without_workspace() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(None, without_timeout());

        assert!(scheduler.poll().await.is_none());
        assert_eq!(gateway.status_started(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_release_guard_when_poll_times_out() {
        let settings = SyncSettings {
            period: Duration::from_secs(30),
            poll_timeout: Some(Duration::from_secs(10)),
        };
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), settings);
        gateway.set_status_delay(Duration::from_secs(60));

        assert!(scheduler.poll().await.is_none());
        assert_eq!(gateway.status_finished(), 0);

        gateway.set_status_delay(Duration::ZERO);
        assert!(scheduler.poll().await.is_some());
        assert_eq!(gateway.status_started(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_let_in_flight_poll_finish_after_stop() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        gateway.set_status_delay(Duration::from_secs(10));

        scheduler.start();
        advance(1).await;
        scheduler.stop();
        advance(20).await;

        assert_eq!(gateway.status_finished(), 1);
        gateway.set_status_delay(Duration::ZERO);
        assert!(scheduler.poll().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_ticking_when_dropped() {
        let (scheduler, gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());

        scheduler.start();
        advance(1).await;
        drop(scheduler);
        advance(120).await;

        assert_eq!(gateway.status_started(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_only_when_enabled_with_workspace() {
        let (scheduler, _gateway, _cache) = fixture::<Brise>(ws("ws-1"), without_timeout());
        scheduler.reconcile(true);
        assert!(scheduler.is_running());
        scheduler.reconcile(false);
        assert!(!scheduler.is_running());

        let (scheduler, _gateway, _cache) = fixture::<Brise>(None, without_timeout());
        scheduler.reconcile(true);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn should_follow_enablement_and_workspace_changes() {
        let gateway = Arc::new(FakeGateway::default());
        let cache = Arc::new(RecordingCache::default());
        let (workspace_tx, workspace) = WatchedWorkspace::channel(None);
        let workspace_rx = workspace.subscribe();
        let (enabled_tx, enabled_rx) = watch::channel(true);
        let scheduler: Arc<Scheduler<Brise, WatchedWorkspace>> = Arc::new(SyncScheduler::new(
            Arc::clone(&gateway),
            workspace,
            Arc::clone(&cache),
            without_timeout(),
        ));

        let supervisor = Arc::clone(&scheduler).supervise(enabled_rx, workspace_rx);
        advance(1).await;
        assert!(!scheduler.is_running());

        workspace_tx.send_replace(ws("ws-9"));
        advance(1).await;
        assert!(scheduler.is_running());
        assert_eq!(gateway.status_requests()[0].1, "ws-9");

        enabled_tx.send_replace(false);
        advance(1).await;
        assert!(!scheduler.is_running());

        enabled_tx.send_replace(true);
        advance(1).await;
        assert!(scheduler.is_running());

        drop(enabled_tx);
        supervisor.await.unwrap();
        assert!(!scheduler.is_running());
    }
}
