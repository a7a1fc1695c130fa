//! Observe notification bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use minioc_domain::representation::Representation;

/// Unsolicited representation of an observed resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub path: String,
    pub payload: Representation,
}

/// Fan-out of [`Notification`]s to in-process observers.
///
/// Publishing never blocks and succeeds even with no subscriber; the
/// notification is then dropped. Slow subscribers lag rather than stall the
/// loop thread.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus that buffers up to `capacity` notifications per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every notification published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish and return how many subscribers got the notification.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}
