//! # Component abstractions.
//!
//! This module provides the component-related types:
//! - [`Component`] - capability trait every managed component implements
//! - [`ComponentFn`] - closure-backed component implementation
//! - [`ComponentRef`] - shared reference to a component (`Arc<dyn Component>`)
//! - [`ComponentState`] - lifecycle state driven by the orchestrator

mod component;
mod component_fn;
mod state;

pub use component::{Component, ComponentRef};
pub use component_fn::ComponentFn;
pub use state::ComponentState;
