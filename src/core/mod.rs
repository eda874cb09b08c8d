//! Runtime core: registry, graph algorithms and lifecycle orchestration.
//!
//! The only types most callers need are [`Orchestrator`] and [`OrchestratorConfig`].
//! [`Registry`], [`validate`] and [`schedule`] are exported for callers that want to
//! inspect a dependency graph without driving it.
//!
//! Internal modules:
//! - [`registry`]: component records and their states;
//! - [`graph`]: arena-indexed graph, unknown-id and cycle checks;
//! - [`scheduler`]: layered topological sort into startup batches;
//! - [`runner`]: runs one batch of component calls concurrently;
//! - [`orchestrator`]: startup, rollback and shutdown state machine;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod graph;
mod orchestrator;
mod registry;
mod runner;
mod scheduler;
mod shutdown;

pub use builder::OrchestratorBuilder;
pub use config::OrchestratorConfig;
pub use graph::validate;
pub use orchestrator::Orchestrator;
pub use registry::{ComponentRecord, Registry};
pub use scheduler::{Batch, schedule};
