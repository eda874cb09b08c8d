//! # depvisor
//!
//! **Depvisor** is a dependency-ordered component lifecycle orchestrator for Rust.
//!
//! Register named components together with the ids they depend on; depvisor
//! validates the dependency graph, starts components in batches (concurrently within
//! a batch, sequentially across batches), unwinds a half-finished startup in reverse
//! order, and shuts everything down dependents-first.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Component   │   │  Component   │   │  Component   │
//!     │ "config"     │   │ "db" →config │   │ "api" →db    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - Registry (id → handle, dependencies, state)                    │
//! │  - validate (unknown ids, three-color DFS cycle check)            │
//! │  - schedule (layered topological sort into batches)               │
//! │  - Bus (broadcast events) + SubscriberSet                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     batch 0            batch 1            batch 2            │
//!     [config]           [db]               [api]              │
//!      │ Publishes        │                  │                 │
//!      │ - BatchStarting  │ - ComponentInit… │ - Component…    │
//!      │ - ComponentRun…  │ - RollbackStart… │                 │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │           (capacity: OrchestratorConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │   (in Orchestrator)    │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ──► Initializing ──► Running ──► Stopping ──► Stopped
//!                  │                          │
//!                  └──────────► Error ◄───────┘
//!
//! initialize_all():
//!   validate ─► schedule ─► for batch: initialize members concurrently, join
//!                                        └─ any failure ─► cleanup started (reverse)
//! terminate_all():
//!   schedule ─► for batch in reverse: cleanup running members concurrently
//!                                      └─ failures recorded, never abort
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                              |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------------------|
//! | **Components**    | Two-call capability contract implemented by managed units.        | [`Component`], [`ComponentFn`], [`ComponentRef`]|
//! | **Orchestration** | Register, validate, start, roll back and stop components.         | [`Orchestrator`], [`OrchestratorBuilder`]       |
//! | **Graph**         | Inspect a dependency graph without running it.                    | [`Registry`], [`validate`], [`schedule`]        |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom subscribers).| [`Subscribe`], [`Event`], [`EventKind`]         |
//! | **Errors**        | Root cause plus secondary failures, never a bare boolean.         | [`OrchestratorError`], [`ComponentError`]       |
//! | **Configuration** | Centralize runtime settings.                                      | [`OrchestratorConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use depvisor::{ComponentError, ComponentFn, ComponentRef, Orchestrator, OrchestratorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<std::sync::Arc<dyn depvisor::Subscribe>> = {
//!         use depvisor::LogWriter;
//!         vec![std::sync::Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<std::sync::Arc<dyn depvisor::Subscribe>> = Vec::new();
//!
//!     let orch = Orchestrator::builder(OrchestratorConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let config: ComponentRef = ComponentFn::init_only(|| async { Ok::<_, ComponentError>(()) });
//!     let db: ComponentRef = ComponentFn::init_only(|| async { Ok::<_, ComponentError>(()) });
//!
//!     // Registration order is free; the graph is checked at startup.
//!     orch.register("db", db, ["config"]).await?;
//!     orch.register("config", config, Vec::<String>::new()).await?;
//!
//!     orch.initialize_all().await?;
//!     assert!(orch.get_state("db").await.is_some_and(|s| s.is_running()));
//!
//!     orch.terminate_all().await?;
//!     Ok(())
//! }
//! ```
mod components;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use components::{Component, ComponentFn, ComponentRef, ComponentState};
pub use core::{
    Batch, ComponentRecord, Orchestrator, OrchestratorBuilder, OrchestratorConfig, Registry,
    schedule, validate,
};
pub use error::{ComponentError, OrchestratorError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in tracing subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
