//! # Component capability.
//!
//! [`Component`] is the only contract the orchestrator requires from the things it
//! manages: bring yourself up, and release what you hold. Connection pools, file
//! handles, model loaders and plugin hosts all plug in behind the same two calls.
//!
//! The common handle type is [`ComponentRef`], an `Arc<dyn Component>` owned by the
//! registry for the component's lifetime and shared with the task that runs a call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ComponentError;

/// Shared handle to a managed component.
pub type ComponentRef = Arc<dyn Component>;

/// # Initializable and cleanable unit.
///
/// The orchestrator guarantees:
/// - `initialize` is called at most once per successful lifecycle, and only after
///   every declared dependency has initialized successfully;
/// - `cleanup` is called exactly once after a successful `initialize`, and only after
///   every component depending on this one has been cleaned up.
///
/// `initialize` does not need to be idempotent.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use depvisor::{Component, ComponentError};
///
/// struct Pool;
///
/// #[async_trait]
/// impl Component for Pool {
///     async fn initialize(&self) -> Result<(), ComponentError> {
///         // open connections...
///         Ok(())
///     }
///
///     async fn cleanup(&self) -> Result<(), ComponentError> {
///         // close connections...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Brings the component up.
    ///
    /// Components that need bounded execution time must enforce it themselves.
    async fn initialize(&self) -> Result<(), ComponentError>;

    /// Releases everything acquired by [`initialize`](Component::initialize).
    async fn cleanup(&self) -> Result<(), ComponentError>;
}
