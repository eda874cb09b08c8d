//! # Component lifecycle state.
//!
//! ```text
//! Created ──► Initializing ──► Running ──► Stopping ──► Stopped
//!                  │                           │
//!                  └────────► Error ◄──────────┘
//! ```
//!
//! Transitions are driven exclusively by the orchestrator. A component can be
//! unregistered only from `Created`, `Stopped` or `Error`.

use std::fmt;

/// Lifecycle state of a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentState {
    /// Registered, never started.
    #[default]
    Created,
    /// `initialize()` is in flight.
    Initializing,
    /// `initialize()` succeeded and the component has not been cleaned up since.
    Running,
    /// `cleanup()` is in flight.
    Stopping,
    /// `cleanup()` succeeded.
    Stopped,
    /// `initialize()` or `cleanup()` failed.
    Error,
}

impl ComponentState {
    /// True for [`ComponentState::Running`].
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, ComponentState::Running)
    }

    /// True if the component may be unregistered from this state.
    #[inline]
    pub fn is_removable(&self) -> bool {
        matches!(
            self,
            ComponentState::Created | ComponentState::Stopped | ComponentState::Error
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentState::Created => "created",
            ComponentState::Initializing => "initializing",
            ComponentState::Running => "running",
            ComponentState::Stopping => "stopping",
            ComponentState::Stopped => "stopped",
            ComponentState::Error => "error",
        }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
