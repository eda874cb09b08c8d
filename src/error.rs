//! Error types used by the depvisor orchestrator and managed components.
//!
//! This module defines two main error enums:
//!
//! - [`OrchestratorError`]: errors raised by the orchestrator itself (registry
//!   misuse, invalid dependency graphs, failed startup/shutdown).
//! - [`ComponentError`]: errors raised by a component's `initialize`/`cleanup`.
//!
//! Both types provide an `as_label` helper for logs/metrics.
//!
//! ## Primary vs secondary failures
//! A failed startup reports **one** root cause ([`OrchestratorError::ComponentInitFailed`])
//! and carries everything else that went wrong while unwinding in its `secondary` list:
//! ```text
//! ComponentInitFailed { id: "db", cause, secondary: [
//!     ComponentInitFailed { id: "cache", .. },     // batch-mate that also failed
//!     ComponentCleanupFailed { id: "config", .. }, // rollback could not release it
//! ] }
//! ```

use std::any::Any;

use thiserror::Error;

use crate::components::ComponentState;

/// # Errors produced by component code.
///
/// Returned by [`Component::initialize`](crate::Component::initialize) and
/// [`Component::cleanup`](crate::Component::cleanup). The orchestrator also
/// produces [`ComponentError::Panicked`] and [`ComponentError::Aborted`] on the
/// component's behalf.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The component reported a failure.
    #[error("component failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Component code panicked; the panic was caught by the orchestrator.
    #[error("component panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The task running the component call was torn down before it reported.
    #[error("component call aborted")]
    Aborted,
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Failed`].
    ///
    /// # Example
    /// ```
    /// use depvisor::ComponentError;
    ///
    /// let err = ComponentError::fail("connection refused");
    /// assert_eq!(err.to_string(), "component failed: connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ComponentError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Failed { .. } => "component_failed",
            ComponentError::Panicked { .. } => "component_panicked",
            ComponentError::Aborted => "component_aborted",
        }
    }
}

/// # Errors produced by the orchestrator.
///
/// Validation errors ([`CycleDetected`](Self::CycleDetected),
/// [`UnknownDependency`](Self::UnknownDependency)) are raised before any
/// component code runs. Startup failures keep the root cause separate from
/// the failures collected while rolling back.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A component with this id is already registered.
    #[error("component '{id}' is already registered")]
    AlreadyRegistered {
        /// The duplicate id.
        id: String,
    },

    /// The operation referenced an id that is not registered.
    #[error("unknown component '{id}'")]
    UnknownComponent {
        /// The unknown id.
        id: String,
    },

    /// A registered component declares a dependency that is not registered.
    #[error("component '{id}' depends on unknown component '{missing}'")]
    UnknownDependency {
        /// The component declaring the dependency.
        id: String,
        /// The dependency id that could not be resolved.
        missing: String,
    },

    /// Unregister was attempted on a component other components depend on.
    #[error("component '{id}' is still required by {dependents:?}")]
    HasDependents {
        /// The component that was to be removed.
        id: String,
        /// Registered components that list `id` as a dependency (sorted).
        dependents: Vec<String>,
    },

    /// Unregister was attempted on a component that is not at rest.
    #[error("component '{id}' cannot be removed while {state}")]
    StillActive {
        /// The component that was to be removed.
        id: String,
        /// Its current state.
        state: ComponentState,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    CycleDetected {
        /// Ids along the cycle, first id repeated at the end.
        path: Vec<String>,
    },

    /// A component's `initialize()` failed; this is the root cause of a failed startup.
    #[error("component '{id}' failed to initialize: {cause}{}", secondary_suffix(.secondary))]
    ComponentInitFailed {
        /// The component whose initialization failed.
        id: String,
        /// What the component reported.
        cause: ComponentError,
        /// Further failures observed while finishing the batch and rolling back.
        secondary: Vec<OrchestratorError>,
    },

    /// A component's `cleanup()` failed (during rollback or terminate).
    #[error("component '{id}' failed to clean up: {cause}")]
    ComponentCleanupFailed {
        /// The component whose cleanup failed.
        id: String,
        /// What the component reported.
        cause: ComponentError,
    },

    /// The operation requires the component to be running.
    #[error("component '{id}' is not running")]
    NotRunning {
        /// The component that is not running.
        id: String,
    },

    /// One or more cleanups failed during `terminate_all`.
    #[error("{} component(s) failed to clean up during terminate", .failures.len())]
    TerminateFailed {
        /// Every [`ComponentCleanupFailed`](Self::ComponentCleanupFailed) observed.
        failures: Vec<OrchestratorError>,
    },

    /// Startup was cancelled by the caller; started components were rolled back.
    #[error("startup cancelled{}", secondary_suffix(.secondary))]
    Cancelled {
        /// Failures observed while rolling back.
        secondary: Vec<OrchestratorError>,
    },
}

fn secondary_suffix(secondary: &[OrchestratorError]) -> String {
    if secondary.is_empty() {
        String::new()
    } else {
        format!(" ({} secondary failure(s))", secondary.len())
    }
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use depvisor::OrchestratorError;
    ///
    /// let err = OrchestratorError::CycleDetected { path: vec!["a".into(), "a".into()] };
    /// assert_eq!(err.as_label(), "cycle_detected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::AlreadyRegistered { .. } => "already_registered",
            OrchestratorError::UnknownComponent { .. } => "unknown_component",
            OrchestratorError::UnknownDependency { .. } => "unknown_dependency",
            OrchestratorError::HasDependents { .. } => "has_dependents",
            OrchestratorError::StillActive { .. } => "still_active",
            OrchestratorError::CycleDetected { .. } => "cycle_detected",
            OrchestratorError::ComponentInitFailed { .. } => "component_init_failed",
            OrchestratorError::ComponentCleanupFailed { .. } => "component_cleanup_failed",
            OrchestratorError::NotRunning { .. } => "not_running",
            OrchestratorError::TerminateFailed { .. } => "terminate_failed",
            OrchestratorError::Cancelled { .. } => "cancelled",
        }
    }

    /// Secondary failures attached to this error (empty for most variants).
    ///
    /// For `TerminateFailed` this is the full list of cleanup failures.
    pub fn secondary(&self) -> &[OrchestratorError] {
        match self {
            OrchestratorError::ComponentInitFailed { secondary, .. }
            | OrchestratorError::Cancelled { secondary } => secondary,
            OrchestratorError::TerminateFailed { failures } => failures,
            _ => &[],
        }
    }

    /// True for errors detected by graph validation, before any component code runs.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrchestratorError::CycleDetected { .. } | OrchestratorError::UnknownDependency { .. }
        )
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = OrchestratorError::CycleDetected {
            path: vec!["x".into(), "y".into(), "x".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: x -> y -> x");
        assert!(err.is_validation());
    }

    #[test]
    fn init_failure_keeps_secondary_separate() {
        let cleanup = OrchestratorError::ComponentCleanupFailed {
            id: "a".into(),
            cause: ComponentError::fail("disk gone"),
        };
        let err = OrchestratorError::ComponentInitFailed {
            id: "b".into(),
            cause: ComponentError::fail("boom"),
            secondary: vec![cleanup.clone()],
        };

        assert_eq!(err.as_label(), "component_init_failed");
        assert_eq!(err.secondary(), &[cleanup]);
        assert_eq!(
            err.to_string(),
            "component 'b' failed to initialize: component failed: boom (1 secondary failure(s))"
        );
    }

    #[test]
    fn plain_errors_have_no_secondary() {
        let err = OrchestratorError::NotRunning { id: "a".into() };
        assert!(err.secondary().is_empty());
        assert!(!err.is_validation());
    }
}
