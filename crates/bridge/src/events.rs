//! Link event publication
//!
//! Fire-and-forget notifications to application code. Delivery is
//! at-most-once per call: no retry, no acknowledgement, and the bridge
//! never waits on a consumer. Subscribers that fall behind lose the oldest
//! events (broadcast lag), which is the right trade for a level-style
//! up/down signal where the latest state wins.

use tokio::sync::broadcast;
use tracing::trace;

/// Link lifecycle event visible to application code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The USB-presented interface became usable.
    Up,
    /// The USB-presented interface went away.
    Down,
}

/// Process-wide event channel for link transitions.
#[derive(Debug, Clone)]
pub struct LinkEventBus {
    tx: broadcast::Sender<LinkEvent>,
}

impl LinkEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers. Never blocks, never
    /// errors; publishing with no subscribers is a no-op.
    pub fn publish(&self, event: LinkEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(?event, delivered, "published link event");
    }

    /// Subscribe to future link events.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LinkEventBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_published_events() {
        let bus = LinkEventBus::new(4);
        let mut rx = bus.subscribe();

        bus.publish(LinkEvent::Up);
        bus.publish(LinkEvent::Down);

        assert_eq!(rx.recv().await.unwrap(), LinkEvent::Up);
        assert_eq!(rx.recv().await.unwrap(), LinkEvent::Down);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = LinkEventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(LinkEvent::Up);
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = LinkEventBus::new(4);
        bus.publish(LinkEvent::Up);

        let mut rx = bus.subscribe();
        bus.publish(LinkEvent::Down);
        assert_eq!(rx.recv().await.unwrap(), LinkEvent::Down);
        assert!(rx.try_recv().is_err());
    }
}
