//! Synchronous collaborator ports consumed by the dispatcher and scheduler.

use std::sync::Arc;

use bmshub_domain::id::WorkspaceId;
use bmshub_domain::notification::Notification;

/// Supplies the active workspace.
pub trait WorkspaceContext {
    /// The workspace every remote call is scoped to, if one is selected.
    fn current_workspace_id(&self) -> Option<WorkspaceId>;
}

/// Fire-and-forget sink for user-visible notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// The external device-list cache. This core only ever invalidates it.
pub trait DeviceCache {
    /// Mark the entry under `key` stale so the next read recomputes it.
    fn invalidate(&self, key: &str);
}

impl<T: WorkspaceContext + ?Sized> WorkspaceContext for Arc<T> {
    fn current_workspace_id(&self) -> Option<WorkspaceId> {
        (**self).current_workspace_id()
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<T: DeviceCache + ?Sized> DeviceCache for Arc<T> {
    fn invalidate(&self, key: &str) {
        (**self).invalidate(key);
    }
}
