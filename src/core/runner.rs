//! # Run one batch of component calls.
//!
//! Fan-out/fan-in executor used by the orchestrator for both directions:
//!
//! ```text
//! members ──► JoinSet::spawn(call_once(member)) × N   (bounded by optional semaphore)
//!                      │
//!                      ▼
//!        join_next() until every member reported   (no sibling is cancelled)
//!                      │
//!                      ▼
//!        Vec<(id, Result)> in completion order
//! ```
//!
//! ## Rules
//! - Every member runs to completion; a failure never cancels its batch-mates
//! - Panics in component code are caught and reported as [`ComponentError::Panicked`]
//! - A member whose task is torn down before reporting is reported as [`ComponentError::Aborted`]
//! - No registry access here: the caller applies state transitions after the join point

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::components::ComponentRef;
use crate::error::{ComponentError, panic_info};

/// Which capability call to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Initialize,
    Cleanup,
}

/// Result of one member of a batch.
pub(crate) type Outcome = (String, Result<(), ComponentError>);

/// Calls `phase` on a single component, converting panics into errors.
pub(crate) async fn call_once(handle: &ComponentRef, phase: Phase) -> Result<(), ComponentError> {
    let fut = match phase {
        Phase::Initialize => handle.initialize(),
        Phase::Cleanup => handle.cleanup(),
    };
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(ComponentError::Panicked {
            info: panic_info(&*payload),
        }),
    }
}

/// Runs `phase` on every member concurrently and waits for all of them.
///
/// Returns one outcome per member, in the order the calls completed.
pub(crate) async fn run_batch(
    members: Vec<(String, ComponentRef)>,
    phase: Phase,
    semaphore: Option<Arc<Semaphore>>,
) -> Vec<Outcome> {
    let expected: Vec<String> = members.iter().map(|(id, _)| id.clone()).collect();
    let mut set = JoinSet::new();

    for (id, handle) in members {
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = match semaphore {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            let res = call_once(&handle, phase).await;
            (id, res)
        });
    }

    let mut outcomes = Vec::with_capacity(expected.len());
    while let Some(joined) = set.join_next().await {
        if let Ok(outcome) = joined {
            outcomes.push(outcome);
        }
    }

    if outcomes.len() < expected.len() {
        let reported: HashSet<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
        let missing: Vec<String> = expected
            .iter()
            .filter(|id| !reported.contains(id.as_str()))
            .cloned()
            .collect();
        outcomes.extend(
            missing
                .into_iter()
                .map(|id| (id, Err(ComponentError::Aborted))),
        );
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::components::ComponentFn;

    #[tokio::test]
    async fn every_member_finishes_even_when_one_fails() {
        let finished = Arc::new(AtomicUsize::new(0));
        let slow_done = finished.clone();

        let failing: ComponentRef =
            ComponentFn::init_only(|| async { Err::<(), _>(ComponentError::fail("nope")) });
        let slow: ComponentRef = ComponentFn::init_only(move || {
            let done = slow_done.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ComponentError>(())
            }
        });

        let mut out = run_batch(
            vec![("bad".into(), failing), ("slow".into(), slow)],
            Phase::Initialize,
            None,
        )
        .await;
        out.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(
            out,
            vec![
                ("bad".to_string(), Err(ComponentError::fail("nope"))),
                ("slow".to_string(), Ok(())),
            ]
        );
    }

    #[tokio::test]
    async fn panics_become_errors() {
        let boom: ComponentRef = ComponentFn::arc(
            || async { Ok::<_, ComponentError>(()) },
            || async {
                if true {
                    panic!("cleanup exploded");
                }
                Ok::<_, ComponentError>(())
            },
        );

        let res = call_once(&boom, Phase::Cleanup).await;
        assert_eq!(
            res,
            Err(ComponentError::Panicked {
                info: "cleanup exploded".into()
            })
        );
    }

    #[tokio::test]
    async fn semaphore_caps_parallelism() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let members: Vec<(String, ComponentRef)> = (0..6)
            .map(|i| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                let comp: ComponentRef = ComponentFn::init_only(move || {
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, ComponentError>(())
                    }
                });
                (format!("c{i}"), comp)
            })
            .collect();

        let out = run_batch(members, Phase::Initialize, Some(Arc::new(Semaphore::new(2)))).await;

        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|(_, r)| r.is_ok()));
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
