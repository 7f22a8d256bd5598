//! Workspace context backed by a `watch` channel.

use tokio::sync::watch;

use bmshub_domain::id::WorkspaceId;

use crate::ports::WorkspaceContext;

/// A workspace that can change at runtime, observed through a `watch` channel.
///
/// Clones share the same channel, so every dispatcher and scheduler holding
/// one sees a switch as soon as the sender publishes it.
#[derive(Debug, Clone)]
pub struct WatchedWorkspace {
    receiver: watch::Receiver<Option<WorkspaceId>>,
}

impl WatchedWorkspace {
    /// Create the context together with the sender used to switch workspaces.
    #[must_use]
    pub fn channel(
        initial: Option<WorkspaceId>,
    ) -> (watch::Sender<Option<WorkspaceId>>, Self) {
        let (sender, receiver) = watch::channel(initial);
        (sender, Self { receiver })
    }

    /// Observe workspace switches.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<WorkspaceId>> {
        self.receiver.clone()
    }
}

impl WorkspaceContext for WatchedWorkspace {
    fn current_workspace_id(&self) -> Option<WorkspaceId> {
        self.receiver.borrow().clone()
    }
}
