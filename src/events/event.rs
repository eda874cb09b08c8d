//! # Lifecycle events emitted by the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: components added to or removed from the registry
//! - **Startup events**: validation, batches, per-component initialization, rollback
//! - **Shutdown events**: per-component cleanup and the overall terminate result
//! - **Subscriber events**: overflow and panics inside observers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, component id,
//! batch index and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use depvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ComponentInitFailed)
//!     .with_component("db")
//!     .with_batch(1)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::ComponentInitFailed);
//! assert_eq!(ev.component.as_deref(), Some("db"));
//! assert_eq!(ev.batch, Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of orchestrator events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `component`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `component`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Registry events ===
    /// Component added to the registry.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `count`: number of declared dependencies
    ComponentRegistered,

    /// Component removed from the registry.
    ///
    /// Sets:
    /// - `component`: component id
    ComponentUnregistered,

    // === Startup events ===
    /// `initialize_all` began real work (graph validated and scheduled).
    ///
    /// Sets:
    /// - `count`: number of batches
    StartupRequested,

    /// Dependency graph validation failed; no component code ran.
    ///
    /// Sets:
    /// - `reason`: validation error
    ValidationFailed,

    /// A batch is about to be processed (startup or shutdown).
    ///
    /// Sets:
    /// - `batch`: batch index (0-based, in startup order)
    /// - `count`: number of components called in this batch
    BatchStarting,

    /// Component entered `Initializing`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index
    ComponentInitializing,

    /// Component reached `Running`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index
    ComponentRunning,

    /// Component `initialize()` failed; component is in `Error`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index
    /// - `reason`: failure message
    ComponentInitFailed,

    /// Rollback of components started in the current call begins.
    ///
    /// Sets:
    /// - `count`: number of components to roll back
    RollbackStarted,

    /// All batches started successfully.
    ///
    /// Sets:
    /// - `count`: number of components initialized in this call
    StartupCompleted,

    /// Startup failed or was cancelled (after rollback).
    ///
    /// Sets:
    /// - `reason`: root cause
    StartupFailed,

    // === Shutdown events ===
    /// `terminate_all` began.
    ///
    /// Sets:
    /// - `count`: number of batches
    ShutdownRequested,

    /// Component entered `Stopping`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index (absent during rollback)
    ComponentStopping,

    /// Component `cleanup()` succeeded; component is `Stopped`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index (absent during rollback)
    ComponentStopped,

    /// Component `cleanup()` failed; component is in `Error`.
    ///
    /// Sets:
    /// - `component`: component id
    /// - `batch`: batch index (absent during rollback)
    /// - `reason`: failure message
    ComponentCleanupFailed,

    /// `terminate_all` finished.
    ///
    /// Sets:
    /// - `count`: number of failed cleanups (0 on success)
    ShutdownCompleted,

    // === Process signals (`run_until_signal`) ===
    /// A termination signal arrived; shutdown follows.
    ///
    /// Sets:
    /// - `reason`: signal name (e.g., "SIGTERM")
    SignalReceived,

    /// Signal handlers could not be installed; shutdown starts immediately.
    ///
    /// Sets:
    /// - `reason`: installation error
    SignalUnavailable,
}

/// Orchestrator event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Component id (or subscriber name for subscriber events).
    pub component: Option<Arc<str>>,
    /// Batch index in startup order.
    pub batch: Option<u32>,
    /// Kind-specific counter (dependencies, batch size, failures...).
    pub count: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            batch: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a component id.
    #[inline]
    pub fn with_component(mut self, id: impl Into<Arc<str>>) -> Self {
        self.component = Some(id.into());
        self
    }

    /// Attaches a batch index.
    #[inline]
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = Some(u32::try_from(batch).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a counter.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_component(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_component(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::BatchStarting);
        let b = Event::new(EventKind::BatchStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_helper_tags_subscriber() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.component.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
