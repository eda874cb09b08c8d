//! # Observer hook for lifecycle events.
//!
//! Anything that wants to watch components come and go (a log sink, a health
//! endpoint, a startup timer) implements [`Subscribe`] and is handed to
//! [`OrchestratorBuilder::with_subscribers`](crate::OrchestratorBuilder::with_subscribers).
//! The orchestrator never waits for a subscriber: a batch of `initialize()` calls
//! proceeds while the events describing it are still queued.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use async_trait::async_trait;
//! use depvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts components that failed to come up.
//! #[derive(Default)]
//! struct InitFailures(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for InitFailures {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ComponentInitFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "init-failures"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receives orchestrator events on its own worker task.
///
/// Events arrive in publish order. A panic inside `on_event` is caught and
/// reported as `SubscriberPanicked`; the subscriber keeps receiving later events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in `SubscriberOverflow`/`SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// How many events may wait for this subscriber before new ones are dropped
    /// (and `SubscriberOverflow` is published). Clamped to at least 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    #[async_trait]
    impl Subscribe for Quiet {
        async fn on_event(&self, _event: &Event) {}
    }

    #[test]
    fn defaults_name_the_type() {
        assert!(Quiet.name().ends_with("Quiet"));
        assert_eq!(Quiet.queue_capacity(), 1024);
    }
}
