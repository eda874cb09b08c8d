//! # Example: startup
//!
//! A small service graph started in dependency order, then stopped dependents-first.
//!
//! Demonstrates how to:
//! - Define components with [`ComponentFn`].
//! - Register them in any order with their dependencies.
//! - Inspect the batches with [`Orchestrator::schedule`].
//! - Run [`Orchestrator::initialize_all`] / [`Orchestrator::terminate_all`].
//!
//! ## Graph
//! ```text
//! config ◄── db ◄──┐
//!    ▲             api
//!    └──── cache ◄─┘
//!
//! batches: [config] → [cache, db] → [api]
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example startup
//! ```

use std::time::Duration;

use depvisor::{ComponentError, ComponentFn, ComponentRef, Orchestrator, OrchestratorConfig};

/// Component that takes `work_ms` to come up and prints both transitions.
fn make_component(name: &'static str, work_ms: u64) -> ComponentRef {
    ComponentFn::arc(
        move || async move {
            println!("[{name}] initializing ({work_ms}ms)");
            tokio::time::sleep(Duration::from_millis(work_ms)).await;
            println!("[{name}] ready");
            Ok::<(), ComponentError>(())
        },
        move || async move {
            println!("[{name}] cleaned up");
            Ok::<(), ComponentError>(())
        },
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let orch = Orchestrator::builder(OrchestratorConfig::default()).build();

    // Registration order does not matter; validation happens at startup.
    orch.register("api", make_component("api", 50), ["db", "cache"])
        .await?;
    orch.register("db", make_component("db", 200), ["config"])
        .await?;
    orch.register("cache", make_component("cache", 100), ["config"])
        .await?;
    orch.register("config", make_component("config", 20), Vec::<String>::new())
        .await?;

    for (n, batch) in orch.schedule().await?.iter().enumerate() {
        println!("batch {n}: {batch:?}");
    }

    orch.initialize_all().await?;
    for (id, state) in orch.states().await {
        println!("{id:>8}: {state}");
    }

    orch.terminate_all().await?;
    Ok(())
}
