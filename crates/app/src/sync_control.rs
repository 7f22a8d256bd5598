//! Runtime switches of the sync loops: the selected workspace and whether
//! polling is enabled.
//!
//! Every [`SyncScheduler::supervise`](crate::sync_scheduler::SyncScheduler::supervise)
//! task and every dispatcher observes the same channels, so one call here
//! re-evaluates all of them.

use tokio::sync::watch;

use bmshub_domain::id::WorkspaceId;

use crate::ports::WorkspaceContext;
use crate::workspace::WatchedWorkspace;

/// Snapshot of both switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncControlState {
    pub workspace_id: Option<WorkspaceId>,
    pub enabled: bool,
}

/// Owner of the workspace and polling-enabled channels.
///
/// The channels stay open for as long as this value lives.
pub struct SyncControl {
    workspace_tx: watch::Sender<Option<WorkspaceId>>,
    workspace: WatchedWorkspace,
    enabled_tx: watch::Sender<bool>,
}

impl SyncControl {
    #[must_use]
    pub fn new(workspace_id: Option<WorkspaceId>, enabled: bool) -> Self {
        let (workspace_tx, workspace) = WatchedWorkspace::channel(workspace_id);
        let (enabled_tx, _) = watch::channel(enabled);
        Self {
            workspace_tx,
            workspace,
            enabled_tx,
        }
    }

    /// Workspace context following [`select_workspace`](Self::select_workspace).
    #[must_use]
    pub fn workspace(&self) -> WatchedWorkspace {
        self.workspace.clone()
    }

    /// Observe [`set_enabled`](Self::set_enabled).
    #[must_use]
    pub fn subscribe_enabled(&self) -> watch::Receiver<bool> {
        self.enabled_tx.subscribe()
    }

    /// Switch every dispatcher and sync loop to `workspace_id`.
    pub fn select_workspace(&self, workspace_id: Option<WorkspaceId>) {
        match &workspace_id {
            Some(id) => tracing::info!(workspace_id = %id, "workspace selected"),
            None => tracing::info!("workspace cleared"),
        }
        self.workspace_tx.send_replace(workspace_id);
    }

    /// Turn polling on or off for every sync loop.
    pub fn set_enabled(&self, enabled: bool) {
        tracing::info!(enabled, "status polling toggled");
        self.enabled_tx.send_replace(enabled);
    }

    #[must_use]
    pub fn state(&self) -> SyncControlState {
        SyncControlState {
            workspace_id: self.workspace.current_workspace_id(),
            enabled: *self.enabled_tx.borrow(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: &str) -> WorkspaceId {
        WorkspaceId::new(id).unwrap()
    }

    #[test]
    fn should_report_initial_switches() {
        let control = SyncControl::new(Some(ws("ws-1")), true);
        assert_eq!(
            control.state(),
            SyncControlState {
                workspace_id: Some(ws("ws-1")),
                enabled: true,
            }
        );
    }

    #[test]
    fn should_propagate_workspace_switch_to_contexts() {
        let control = SyncControl::new(None, true);
        let workspace = control.workspace();

        control.select_workspace(Some(ws("ws-2")));

        assert_eq!(workspace.current_workspace_id(), Some(ws("ws-2")));
        assert_eq!(control.state().workspace_id, Some(ws("ws-2")));
    }

    #[tokio::test]
    async fn should_wake_enabled_subscribers() {
        let control = SyncControl::new(None, true);
        let mut enabled = control.subscribe_enabled();

        control.set_enabled(false);

        enabled.changed().await.unwrap();
        assert!(!*enabled.borrow());
        assert!(!control.state().enabled);
    }
}
