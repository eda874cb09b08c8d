//! # Example: rollback
//!
//! Shows what a failed startup leaves behind.
//!
//! `cache` fails to initialize after `config` and `db` are already running. The
//! batch is allowed to finish, then everything started by this call is cleaned up in
//! reverse order and the root cause is returned together with any secondary failure.
//!
//! ## Flow
//! ```text
//! batch 0: config            ─► Running
//! batch 1: db, cache         ─► db Running, cache Error
//! rollback: db, config       ─► Stopped (db cleanup fails → secondary)
//! result: ComponentInitFailed { id: "cache", secondary: [ComponentCleanupFailed { id: "db" }] }
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example rollback
//! ```

use depvisor::{
    ComponentError, ComponentFn, ComponentRef, Orchestrator, OrchestratorConfig,
    OrchestratorError,
};

fn ok(name: &'static str) -> ComponentRef {
    ComponentFn::arc(
        move || async move {
            println!("[{name}] up");
            Ok::<(), ComponentError>(())
        },
        move || async move {
            println!("[{name}] down");
            Ok::<(), ComponentError>(())
        },
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let orch = Orchestrator::builder(OrchestratorConfig::default()).build();

    let db: ComponentRef = ComponentFn::arc(
        || async {
            println!("[db] up");
            Ok::<(), ComponentError>(())
        },
        || async {
            println!("[db] down failed");
            Err::<(), _>(ComponentError::fail("connection pool still busy"))
        },
    );
    let cache: ComponentRef = ComponentFn::init_only(|| async {
        println!("[cache] refusing to start");
        Err::<(), _>(ComponentError::fail("redis unreachable"))
    });

    orch.register("config", ok("config"), Vec::<String>::new())
        .await?;
    orch.register("db", db, ["config"]).await?;
    orch.register("cache", cache, ["config"]).await?;

    match orch.initialize_all().await {
        Ok(()) => println!("started (unexpected)"),
        Err(OrchestratorError::ComponentInitFailed { id, cause, secondary }) => {
            println!("startup failed because of '{id}': {cause}");
            for err in secondary {
                println!("  while unwinding: {err}");
            }
        }
        Err(other) => return Err(other.into()),
    }

    for (id, state) in orch.states().await {
        println!("{id:>8}: {state}");
    }
    Ok(())
}
