//! # Example: logging
//!
//! Wires the built-in [`LogWriter`] subscriber into `tracing_subscriber` and runs a
//! graph until Ctrl-C (or SIGTERM), then shuts it down.
//!
//! ## Run
//! ```bash
//! RUST_LOG=depvisor=debug cargo run --example logging --features logging
//! ```

use std::sync::Arc;

use depvisor::{
    ComponentError, ComponentFn, ComponentRef, LogWriter, Orchestrator, OrchestratorConfig,
    Subscribe,
};
use tracing_subscriber::EnvFilter;

fn component() -> ComponentRef {
    ComponentFn::init_only(|| async { Ok::<(), ComponentError>(()) })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("depvisor=info")),
        )
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let cfg = OrchestratorConfig {
        max_concurrent: 2,
        ..OrchestratorConfig::default()
    };
    let orch = Orchestrator::builder(cfg).with_subscribers(subs).build();

    orch.register("config", component(), Vec::<String>::new())
        .await?;
    orch.register("metrics", component(), ["config"]).await?;
    orch.register("db", component(), ["config"]).await?;
    orch.register("http", component(), ["db", "metrics"]).await?;

    println!("running; press Ctrl-C to stop");
    orch.run_until_signal().await?;
    Ok(())
}
