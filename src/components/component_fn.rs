//! # Closure-backed component (`ComponentFn`)
//!
//! [`ComponentFn`] wraps two closures, one per capability call. Each call produces a
//! fresh future, so no state leaks between calls; share state explicitly with
//! `Arc<...>` captured by both closures.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use depvisor::{ComponentError, ComponentFn, ComponentRef};
//!
//! let open = Arc::new(AtomicBool::new(false));
//! let (up, down) = (open.clone(), open.clone());
//!
//! let pool: ComponentRef = ComponentFn::arc(
//!     move || {
//!         let up = up.clone();
//!         async move {
//!             up.store(true, Ordering::SeqCst);
//!             Ok::<_, ComponentError>(())
//!         }
//!     },
//!     move || {
//!         let down = down.clone();
//!         async move {
//!             down.store(false, Ordering::SeqCst);
//!             Ok::<_, ComponentError>(())
//!         }
//!     },
//! );
//! # let _ = pool;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::components::component::Component;
use crate::error::ComponentError;

/// Function-backed component implementation.
pub struct ComponentFn<I, C> {
    init: I,
    cleanup: C,
}

impl<I, C> ComponentFn<I, C> {
    /// Creates a new function-backed component.
    ///
    /// Prefer [`ComponentFn::arc`] when you immediately need a [`ComponentRef`](crate::ComponentRef).
    pub fn new(init: I, cleanup: C) -> Self {
        Self { init, cleanup }
    }

    /// Creates the component and returns it as a shared handle.
    pub fn arc(init: I, cleanup: C) -> Arc<Self> {
        Arc::new(Self::new(init, cleanup))
    }
}

impl<I> ComponentFn<I, fn() -> std::future::Ready<Result<(), ComponentError>>> {
    /// Creates a component whose cleanup is a no-op.
    pub fn init_only(init: I) -> Arc<Self> {
        Arc::new(Self::new(init, || std::future::ready(Ok(()))))
    }
}

#[async_trait]
impl<I, IFut, C, CFut> Component for ComponentFn<I, C>
where
    I: Fn() -> IFut + Send + Sync + 'static,
    IFut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    C: Fn() -> CFut + Send + Sync + 'static,
    CFut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    async fn initialize(&self) -> Result<(), ComponentError> {
        (self.init)().await
    }

    async fn cleanup(&self) -> Result<(), ComponentError> {
        (self.cleanup)().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn calls_the_matching_closure() {
        let inits = Arc::new(AtomicUsize::new(0));
        let cleanups = Arc::new(AtomicUsize::new(0));
        let (i, c) = (inits.clone(), cleanups.clone());

        let comp = ComponentFn::arc(
            move || {
                i.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ComponentError>(()) }
            },
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Err(ComponentError::fail("still busy")) }
            },
        );

        assert!(comp.initialize().await.is_ok());
        assert_eq!(comp.cleanup().await, Err(ComponentError::fail("still busy")));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn init_only_has_noop_cleanup() {
        let comp = ComponentFn::init_only(|| async { Ok::<_, ComponentError>(()) });
        assert!(comp.initialize().await.is_ok());
        assert!(comp.cleanup().await.is_ok());
    }
}
