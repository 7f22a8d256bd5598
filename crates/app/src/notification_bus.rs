//! In-process notification bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use bmshub_domain::notification::{Notification, NotificationVariant};

use crate::ports::Notifier;

/// In-process [`Notifier`] using a tokio [`broadcast`] channel.
///
/// Every notification is also written to the log, so a daemon without a
/// UI attached still records what the user would have seen. Notifying
/// succeeds even when there are no active subscribers.
pub struct InProcessNotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl InProcessNotificationBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications emitted *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Notifier for InProcessNotificationBus {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Destructive => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "user notification"
            ),
            NotificationVariant::Default => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "user notification"
            ),
        }
        // Fails only without receivers.
        let _ = self.sender.send(notification);
    }
}
