//! # Event bus.
//!
//! Every lifecycle transition the orchestrator makes is published here. The bus has
//! two kinds of readers: the orchestrator's own listener, which forwards to the
//! [`SubscriberSet`](crate::SubscriberSet), and any receiver handed out by
//! [`Orchestrator::events`](crate::Orchestrator::events).
//!
//! ```text
//! Orchestrator ─┐                      ┌─► listener ─► SubscriberSet
//!               ├─► Bus (broadcast) ───┤
//! workers ──────┘                      └─► Orchestrator::events() receivers
//! ```
//!
//! Publishing never waits on a component or a reader. A reader that falls more than
//! `bus_capacity` events behind loses the oldest ones (`RecvError::Lagged`).

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the orchestrator's broadcast channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus buffering up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev`; dropped silently when nobody is listening.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn subscriber_sees_events_published_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::StartupRequested));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::StartupCompleted).with_count(3));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::StartupCompleted);
        assert_eq!(ev.count, Some(3));
    }

    #[tokio::test]
    async fn lagging_reader_skips_oldest_events() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for kind in [
            EventKind::BatchStarting,
            EventKind::ComponentRunning,
            EventKind::StartupCompleted,
        ] {
            bus.publish(Event::new(kind));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ComponentRunning);
    }
}
