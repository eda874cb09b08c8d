//! # Orchestrator: dependency-ordered startup, rollback and shutdown.
//!
//! The [`Orchestrator`] owns the component [`Registry`], the event bus and the
//! [`SubscriberSet`]. It validates the dependency graph, splits it into batches and
//! drives every component through its state machine.
//!
//! ## Startup (`initialize_all`)
//! ```text
//! all running? ──yes──► Ok (no-op)
//!      │no
//!      ▼
//! validate + schedule ──err──► ValidationFailed, return (no component touched)
//!      │
//!      ▼
//! for batch in batches:                      started = []  (stack, completion order)
//!   ├─► members not Running → Initializing
//!   ├─► run_batch(initialize)  fan-out, wait for every member
//!   ├─► Ok  → Running, push to started
//!   ├─► Err → Error (whole batch still joins)
//!   └─► any Err / cancelled ─► rollback(started reversed) ─► return root cause
//! ```
//!
//! ## Shutdown (`terminate_all`)
//! ```text
//! batches = schedule(all) ──err──► ValidationFailed, schedule(Running only)
//! for batch in batches.rev():
//!   ├─► Running members → Stopping
//!   ├─► run_batch(cleanup)
//!   └─► Ok → Stopped, Err → Error (recorded, never aborts the loop)
//! ```
//!
//! ## Locking
//! - Lifecycle calls (`register`, `unregister`, `initialize_all*`, `terminate_all`) are
//!   serialized by one async mutex.
//! - The registry sits behind an `RwLock` taken only to read a snapshot or apply state
//!   updates, never across a component call, so `get_state` stays responsive while a
//!   slow component initializes.
//!
//! ## Subscribers
//! A listener task forwards bus events to the [`SubscriberSet`]. [`Orchestrator::close`]
//! stops it after delivering everything already published; `run` and
//! `run_until_signal` close on their way out.
//!
//! ## Cancellation
//! Use [`Orchestrator::initialize_all_until`] to abort a startup: the token is checked
//! between batches and a batch in flight always runs to completion before rollback.
//! Dropping the `initialize_all` future instead aborts in-flight calls and leaves
//! those components in `Initializing`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, Semaphore, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::components::{ComponentRef, ComponentState};
use crate::core::config::OrchestratorConfig;
use crate::core::graph;
use crate::core::registry::{ComponentRecord, Registry};
use crate::core::runner::{self, Outcome, Phase};
use crate::core::scheduler::{self, Batch};
use crate::core::shutdown;
use crate::error::{ComponentError, OrchestratorError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Drives registered components through startup and shutdown in dependency order.
pub struct Orchestrator {
    cfg: OrchestratorConfig,
    bus: Bus,
    registry: RwLock<Registry>,
    lifecycle: Mutex<()>,
    semaphore: Option<Arc<Semaphore>>,
    listener_token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Creates a builder for an orchestrator with the given configuration.
    pub fn builder(cfg: OrchestratorConfig) -> crate::core::builder::OrchestratorBuilder {
        crate::core::builder::OrchestratorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: OrchestratorConfig,
        bus: Bus,
        subs: SubscriberSet,
        semaphore: Option<Arc<Semaphore>>,
    ) -> Self {
        let listener_token = CancellationToken::new();
        let listener = Self::subscriber_listener(&bus, subs, listener_token.clone());
        Self {
            cfg,
            bus,
            registry: RwLock::new(Registry::new()),
            lifecycle: Mutex::new(()),
            semaphore,
            listener_token,
            listener: Mutex::new(listener),
        }
    }

    /// Forwards bus events to `set` until `token` fires.
    ///
    /// On cancellation the events still buffered for this receiver are delivered, then
    /// the set is shut down so its workers finish their queues.
    fn subscriber_listener(
        bus: &Bus,
        set: SubscriberSet,
        token: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if set.is_empty() {
            return None;
        }
        let mut rx = bus.subscribe();

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        }))
    }

    /// Stops event delivery once subscribers have seen every event published so far.
    ///
    /// Later events are still visible through [`events`](Self::events) but no longer
    /// reach subscribers. Calling it again is a no-op.
    pub async fn close(&self) {
        self.listener_token.cancel();
        let handle = self.listener.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// The configuration this orchestrator was built with.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }

    /// Subscribes directly to the event bus.
    ///
    /// The receiver observes every event published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    // ---------------------------
    // Registry operations
    // ---------------------------

    /// Registers a component with the ids it depends on.
    ///
    /// Dependencies are not validated here: components may be registered in any order,
    /// and unknown ids or cycles are reported by [`validate`](Self::validate) /
    /// [`initialize_all`](Self::initialize_all).
    pub async fn register<I, S>(
        &self,
        id: impl Into<String>,
        handle: ComponentRef,
        dependencies: I,
    ) -> Result<(), OrchestratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let _cycle = self.lifecycle.lock().await;

        let count = {
            let mut reg = self.registry.write().await;
            reg.register(id.clone(), handle, dependencies)?;
            reg.get(&id).map(|r| r.dependencies().len()).unwrap_or(0)
        };
        self.bus.publish(
            Event::new(EventKind::ComponentRegistered)
                .with_component(id.as_str())
                .with_count(count),
        );
        Ok(())
    }

    /// Removes a component that is at rest and that nothing depends on.
    pub async fn unregister(&self, id: &str) -> Result<(), OrchestratorError> {
        let _cycle = self.lifecycle.lock().await;
        self.registry.write().await.unregister(id)?;
        self.bus
            .publish(Event::new(EventKind::ComponentUnregistered).with_component(id));
        Ok(())
    }

    /// Current state of `id`, or `None` if it is not registered.
    pub async fn get_state(&self, id: &str) -> Option<ComponentState> {
        self.registry.read().await.state(id)
    }

    /// Snapshot of the record for `id`.
    pub async fn get(&self, id: &str) -> Option<ComponentRecord> {
        self.registry.read().await.get(id)
    }

    /// Sorted list of registered ids.
    pub async fn list_ids(&self) -> Vec<String> {
        self.registry.read().await.ids()
    }

    /// Sorted `(id, state)` snapshot of every component.
    pub async fn states(&self) -> Vec<(String, ComponentState)> {
        self.registry
            .read()
            .await
            .list()
            .into_iter()
            .map(|r| (r.id().to_string(), r.state()))
            .collect()
    }

    /// Returns the handle of a running component.
    ///
    /// Fails with `UnknownComponent` or `NotRunning`.
    pub async fn get_running(&self, id: &str) -> Result<ComponentRef, OrchestratorError> {
        let reg = self.registry.read().await;
        let record = reg
            .get(id)
            .ok_or_else(|| OrchestratorError::UnknownComponent { id: id.to_string() })?;
        if !record.state().is_running() {
            return Err(OrchestratorError::NotRunning { id: id.to_string() });
        }
        Ok(record.handle().clone())
    }

    /// Validates the current dependency graph without touching any component.
    pub async fn validate(&self) -> Result<(), OrchestratorError> {
        graph::validate(&*self.registry.read().await)
    }

    /// Computes the startup batches for the current registry.
    pub async fn schedule(&self) -> Result<Vec<Batch>, OrchestratorError> {
        scheduler::schedule(&*self.registry.read().await)
    }

    // ---------------------------
    // Startup
    // ---------------------------

    /// Initializes every component in dependency order.
    ///
    /// No-op when everything is already running. On the first failing batch, the
    /// components started by this call are cleaned up in reverse order and the
    /// root cause is returned as `ComponentInitFailed`.
    pub async fn initialize_all(&self) -> Result<(), OrchestratorError> {
        self.initialize_all_until(&CancellationToken::new()).await
    }

    /// Like [`initialize_all`](Self::initialize_all), but stops between batches once
    /// `cancel` fires, rolls back and returns `Cancelled`.
    pub async fn initialize_all_until(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let _cycle = self.lifecycle.lock().await;

        let batches = {
            let reg = self.registry.read().await;
            if reg.all_running() {
                return Ok(());
            }
            self.checked_schedule(&reg)?
        };
        self.bus
            .publish(Event::new(EventKind::StartupRequested).with_count(batches.len()));

        let mut started: Vec<String> = Vec::new();
        for (n, batch) in batches.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.abort_startup(started, Vec::new()).await);
            }

            let members = self
                .enter(
                    batch,
                    n,
                    |s| !s.is_running(),
                    ComponentState::Initializing,
                    EventKind::ComponentInitializing,
                )
                .await;
            if members.is_empty() {
                continue;
            }
            self.publish_batch(n, members.len());

            let outcomes = runner::run_batch(members, Phase::Initialize, self.semaphore.clone()).await;

            let mut failures = Vec::new();
            for (id, res) in outcomes {
                match res {
                    Ok(()) => {
                        self.set_state(&id, ComponentState::Running, None).await;
                        self.bus.publish(
                            Event::new(EventKind::ComponentRunning)
                                .with_component(id.as_str())
                                .with_batch(n),
                        );
                        started.push(id);
                    }
                    Err(cause) => {
                        self.set_state(&id, ComponentState::Error, Some(cause.clone()))
                            .await;
                        self.bus.publish(
                            Event::new(EventKind::ComponentInitFailed)
                                .with_component(id.as_str())
                                .with_batch(n)
                                .with_reason(cause.to_string()),
                        );
                        failures.push((id, cause));
                    }
                }
            }

            if !failures.is_empty() || cancel.is_cancelled() {
                return Err(self.abort_startup(started, failures).await);
            }
        }

        self.bus
            .publish(Event::new(EventKind::StartupCompleted).with_count(started.len()));
        Ok(())
    }

    /// Rolls back `started` and builds the error returned to the caller.
    ///
    /// With init failures, the one with the smallest id is the root cause and the
    /// rest, followed by rollback cleanup failures, become secondary errors. Without
    /// init failures the startup was cancelled.
    async fn abort_startup(
        &self,
        started: Vec<String>,
        mut failures: Vec<(String, ComponentError)>,
    ) -> OrchestratorError {
        let rollback = self.rollback(started).await;

        failures.sort_by(|a, b| a.0.cmp(&b.0));
        let mut failures = failures.into_iter();
        let err = match failures.next() {
            Some((id, cause)) => {
                let mut secondary: Vec<OrchestratorError> = failures
                    .map(|(id, cause)| OrchestratorError::ComponentInitFailed {
                        id,
                        cause,
                        secondary: Vec::new(),
                    })
                    .collect();
                secondary.extend(rollback);
                OrchestratorError::ComponentInitFailed {
                    id,
                    cause,
                    secondary,
                }
            }
            None => OrchestratorError::Cancelled {
                secondary: rollback,
            },
        };

        self.bus
            .publish(Event::new(EventKind::StartupFailed).with_reason(err.to_string()));
        err
    }

    /// Cleans up `started` in strict reverse order, one at a time.
    async fn rollback(&self, started: Vec<String>) -> Vec<OrchestratorError> {
        if started.is_empty() {
            return Vec::new();
        }
        self.bus
            .publish(Event::new(EventKind::RollbackStarted).with_count(started.len()));

        let mut failures = Vec::new();
        for id in started.into_iter().rev() {
            let Some(handle) = self.registry.read().await.handle(&id) else {
                continue;
            };
            self.set_state(&id, ComponentState::Stopping, None).await;
            self.bus
                .publish(Event::new(EventKind::ComponentStopping).with_component(id.as_str()));

            let res = runner::call_once(&handle, Phase::Cleanup).await;
            if let Some(err) = self.finish_cleanup(id, res, None).await {
                failures.push(err);
            }
        }
        failures
    }

    // ---------------------------
    // Shutdown
    // ---------------------------

    /// Cleans up every running component in reverse batch order.
    ///
    /// If components registered since the last startup broke the graph, the order is
    /// taken from the running components alone and the breakage is only reported as
    /// `ValidationFailed`.
    ///
    /// Best-effort: a failed cleanup is recorded and every other running component
    /// still gets its cleanup. Returns `TerminateFailed` listing every failure.
    pub async fn terminate_all(&self) -> Result<(), OrchestratorError> {
        let _cycle = self.lifecycle.lock().await;

        let batches = {
            let reg = self.registry.read().await;
            match self.checked_schedule(&reg) {
                Ok(batches) => batches,
                Err(_) => scheduler::schedule_running(&reg)?,
            }
        };
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_count(batches.len()));

        let mut failures = Vec::new();
        for (n, batch) in batches.iter().enumerate().rev() {
            let members = self
                .enter(
                    batch,
                    n,
                    |s| s.is_running(),
                    ComponentState::Stopping,
                    EventKind::ComponentStopping,
                )
                .await;
            if members.is_empty() {
                continue;
            }
            self.publish_batch(n, members.len());

            let mut outcomes: Vec<Outcome> =
                runner::run_batch(members, Phase::Cleanup, self.semaphore.clone()).await;
            outcomes.sort_by(|a, b| a.0.cmp(&b.0));
            for (id, res) in outcomes {
                if let Some(err) = self.finish_cleanup(id, res, Some(n)).await {
                    failures.push(err);
                }
            }
        }

        self.bus
            .publish(Event::new(EventKind::ShutdownCompleted).with_count(failures.len()));
        if failures.is_empty() {
            Ok(())
        } else {
            Err(OrchestratorError::TerminateFailed { failures })
        }
    }

    /// Initializes everything, waits for `stop`, then terminates everything.
    ///
    /// Startup failures are returned right after rollback. Either way subscribers are
    /// [closed](Self::close) before returning, so they have seen the final events.
    pub async fn run<F>(&self, stop: F) -> Result<(), OrchestratorError>
    where
        F: Future<Output = ()>,
    {
        let res = match self.initialize_all().await {
            Ok(()) => {
                stop.await;
                self.terminate_all().await
            }
            Err(err) => Err(err),
        };
        self.close().await;
        res
    }

    /// [`run`](Self::run) until the process receives a termination signal
    /// (SIGINT/SIGTERM/SIGQUIT on unix, Ctrl-C elsewhere).
    ///
    /// The trigger is published as `SignalReceived`. If signal handlers cannot be
    /// installed, `SignalUnavailable` is published and shutdown starts right away.
    pub async fn run_until_signal(&self) -> Result<(), OrchestratorError> {
        self.run(async {
            let trigger = shutdown::termination().await;
            self.bus.publish(trigger.event());
        })
        .await
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Validates and schedules, reporting validation failures on the bus.
    fn checked_schedule(&self, reg: &Registry) -> Result<Vec<Batch>, OrchestratorError> {
        scheduler::schedule(reg).inspect_err(|err| {
            self.bus
                .publish(Event::new(EventKind::ValidationFailed).with_reason(err.to_string()));
        })
    }

    /// Moves batch members whose state passes `eligible` into `to`.
    ///
    /// Returns the members to call, in batch order.
    async fn enter(
        &self,
        batch: &[String],
        n: usize,
        eligible: fn(&ComponentState) -> bool,
        to: ComponentState,
        kind: EventKind,
    ) -> Vec<(String, ComponentRef)> {
        let mut reg = self.registry.write().await;
        let mut members = Vec::with_capacity(batch.len());

        for id in batch {
            let Some(record) = reg.get(id) else {
                continue;
            };
            if !eligible(&record.state()) {
                continue;
            }
            reg.set_state(id, to, None);
            members.push((id.clone(), record.handle().clone()));
            self.bus
                .publish(Event::new(kind).with_component(id.as_str()).with_batch(n));
        }
        members
    }

    /// Applies the result of a cleanup call; returns the error to record, if any.
    async fn finish_cleanup(
        &self,
        id: String,
        res: Result<(), ComponentError>,
        batch: Option<usize>,
    ) -> Option<OrchestratorError> {
        match res {
            Ok(()) => {
                self.set_state(&id, ComponentState::Stopped, None).await;
                let mut ev = Event::new(EventKind::ComponentStopped).with_component(id.as_str());
                if let Some(n) = batch {
                    ev = ev.with_batch(n);
                }
                self.bus.publish(ev);
                None
            }
            Err(cause) => {
                self.set_state(&id, ComponentState::Error, Some(cause.clone()))
                    .await;
                let mut ev = Event::new(EventKind::ComponentCleanupFailed)
                    .with_component(id.as_str())
                    .with_reason(cause.to_string());
                if let Some(n) = batch {
                    ev = ev.with_batch(n);
                }
                self.bus.publish(ev);
                Some(OrchestratorError::ComponentCleanupFailed { id, cause })
            }
        }
    }

    fn publish_batch(&self, n: usize, size: usize) {
        self.bus.publish(
            Event::new(EventKind::BatchStarting)
                .with_batch(n)
                .with_count(size),
        );
    }

    async fn set_state(&self, id: &str, state: ComponentState, error: Option<ComponentError>) {
        self.registry.write().await.set_state(id, state, error);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.listener_token.cancel();
    }
}
