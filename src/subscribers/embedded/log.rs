//! # LogWriter: tracing bridge
//!
//! A subscriber that forwards every [`Event`] to [`tracing`], with the component id,
//! batch index and reason as structured fields. Failures are logged at `warn`/`error`,
//! the normal lifecycle at `info`, per-component progress at `debug`.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO depvisor: startup requested batches=3
//! DEBUG depvisor: component running component="db" batch=0
//! ERROR depvisor: component failed to initialize component="cache" batch=1 reason="..."
//! WARN depvisor: rolling back started components count=1
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ComponentRegistered => {
                debug!(target: "depvisor", component, dependencies = ?e.count, "component registered");
            }
            EventKind::ComponentUnregistered => {
                debug!(target: "depvisor", component, "component unregistered");
            }
            EventKind::StartupRequested => {
                info!(target: "depvisor", batches = ?e.count, "startup requested");
            }
            EventKind::ValidationFailed => {
                error!(target: "depvisor", reason, "dependency graph rejected");
            }
            EventKind::BatchStarting => {
                debug!(target: "depvisor", batch = ?e.batch, size = ?e.count, "batch starting");
            }
            EventKind::ComponentInitializing => {
                debug!(target: "depvisor", component, batch = ?e.batch, "component initializing");
            }
            EventKind::ComponentRunning => {
                debug!(target: "depvisor", component, batch = ?e.batch, "component running");
            }
            EventKind::ComponentInitFailed => {
                error!(target: "depvisor", component, batch = ?e.batch, reason, "component failed to initialize");
            }
            EventKind::RollbackStarted => {
                warn!(target: "depvisor", count = ?e.count, "rolling back started components");
            }
            EventKind::StartupCompleted => {
                info!(target: "depvisor", initialized = ?e.count, "startup completed");
            }
            EventKind::StartupFailed => {
                error!(target: "depvisor", reason, "startup failed");
            }
            EventKind::ShutdownRequested => {
                info!(target: "depvisor", batches = ?e.count, "shutdown requested");
            }
            EventKind::ComponentStopping => {
                debug!(target: "depvisor", component, batch = ?e.batch, "component stopping");
            }
            EventKind::ComponentStopped => {
                debug!(target: "depvisor", component, batch = ?e.batch, "component stopped");
            }
            EventKind::ComponentCleanupFailed => {
                error!(target: "depvisor", component, batch = ?e.batch, reason, "component failed to clean up");
            }
            EventKind::ShutdownCompleted => {
                info!(target: "depvisor", failures = ?e.count, "shutdown completed");
            }
            EventKind::SignalReceived => {
                info!(target: "depvisor", signal = reason, "termination signal received");
            }
            EventKind::SignalUnavailable => {
                warn!(target: "depvisor", reason, "signal handlers unavailable, stopping now");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "depvisor", subscriber = component, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "depvisor", subscriber = component, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
