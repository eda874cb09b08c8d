//! # Event subscribers for the depvisor orchestrator.
//!
//! This module provides the [`Subscribe`] trait, the observer hook injected into the
//! orchestrator, and [`SubscriberSet`], which fans events out to every subscriber.
//!
//! ## Architecture
//! ```text
//! Orchestrator ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                       │
//!                                                      ┌────────────────┼───────────┐
//!                                                      ▼                ▼           ▼
//!                                                  LogWriter         Metrics     Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use depvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::ComponentInitFailed) {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod embedded;

pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
