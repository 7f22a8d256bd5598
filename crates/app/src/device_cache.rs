//! In-process device cache invalidation tracker.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::ports::DeviceCache;

/// [`DeviceCache`] that records a generation counter per key and broadcasts
/// the key of every invalidation.
///
/// Readers compare generations (or listen on [`subscribe`](Self::subscribe))
/// to learn that their copy of a device list is stale and must be re-read.
pub struct InProcessDeviceCache {
    generations: Mutex<HashMap<String, u64>>,
    sender: broadcast::Sender<String>,
}

impl InProcessDeviceCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            generations: Mutex::new(HashMap::new()),
            sender,
        }
    }

    /// Receive the key of every invalidation made after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// How many times `key` has been invalidated.
    #[must_use]
    pub fn generation(&self, key: &str) -> u64 {
        self.generations().get(key).copied().unwrap_or_default()
    }

    fn generations(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceCache for InProcessDeviceCache {
    fn invalidate(&self, key: &str) {
        *self.generations().entry(key.to_string()).or_default() += 1;
        tracing::debug!(key, "device cache invalidated");
        let _ = self.sender.send(key.to_string());
    }
}
