//! # Batch scheduling (layered topological sort).
//!
//! Turns a validated dependency graph into an ordered list of batches such that every
//! dependency of a member of batch *N* lives in batches *0..N-1*. Each component lands
//! in the earliest batch its dependencies allow, which gives the coarsest legal
//! grouping and therefore the most parallelism.
//!
//! ```text
//! a        b → a      c → a      d → b, c
//!
//! batch 0: [a]
//! batch 1: [b, c]
//! batch 2: [d]
//! ```
//!
//! ## Rules
//! - Components without dependencies are always in batch 0
//! - Ids are sorted lexicographically inside a batch (deterministic output)
//! - The same registry always yields the same batches

use crate::core::graph::DependencyGraph;
use crate::core::registry::Registry;
use crate::error::OrchestratorError;

/// Ids that may run concurrently (sorted).
pub type Batch = Vec<String>;

/// Validates the registry and computes its startup batches.
///
/// Errors come only from validation (`UnknownDependency`, `CycleDetected`).
pub fn schedule(registry: &Registry) -> Result<Vec<Batch>, OrchestratorError> {
    let graph = DependencyGraph::build(registry)?;
    graph.check_acyclic()?;
    Ok(layers(&graph))
}

/// Batches of the components that are currently `Running`.
///
/// Used to stop what is running when the full registry no longer validates.
pub(crate) fn schedule_running(registry: &Registry) -> Result<Vec<Batch>, OrchestratorError> {
    let graph = DependencyGraph::running(registry);
    graph.check_acyclic()?;
    Ok(layers(&graph))
}

/// Kahn-style layering over an acyclic graph.
///
/// A node joins the frontier once all of its dependencies have been placed, so the
/// frontier of round *N* is exactly `{ id ∉ placed : deps(id) ⊆ placed }`.
fn layers(graph: &DependencyGraph) -> Vec<Batch> {
    let n = graph.len();
    let mut pending: Vec<usize> = (0..n).map(|i| graph.deps(i).len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for node in 0..n {
        for &dep in graph.deps(node) {
            dependents[dep].push(node);
        }
    }

    // Node indices follow sorted id order, so sorting indices sorts ids.
    let mut frontier: Vec<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
    let mut batches = Vec::new();

    while !frontier.is_empty() {
        frontier.sort_unstable();
        let mut next = Vec::new();
        for &node in &frontier {
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }
        batches.push(frontier.iter().map(|&i| graph.id(i).to_string()).collect());
        frontier = next;
    }
    batches
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use proptest::prelude::*;

    use super::*;
    use crate::core::registry::tests::{noop, registry};

    fn batches(raw: &[&[&str]]) -> Vec<Batch> {
        raw.iter()
            .map(|b| b.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn diamond_yields_three_batches() {
        let reg = registry(&[("d", &["b", "c"]), ("c", &["a"]), ("b", &["a"]), ("a", &[])]);
        assert_eq!(
            schedule(&reg).unwrap(),
            batches(&[&["a"], &["b", "c"], &["d"]])
        );
    }

    #[test]
    fn independent_components_share_batch_zero() {
        let reg = registry(&[("z", &[]), ("m", &[]), ("a", &[]), ("q", &["z"])]);
        assert_eq!(
            schedule(&reg).unwrap(),
            batches(&[&["a", "m", "z"], &["q"]])
        );
    }

    #[test]
    fn placed_at_earliest_legal_batch() {
        // e only needs a, so it runs next to b even though d sits deeper.
        let reg = registry(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("d", &["c"]),
            ("e", &["a"]),
        ]);
        assert_eq!(
            schedule(&reg).unwrap(),
            batches(&[&["a"], &["b", "e"], &["c"], &["d"]])
        );
    }

    #[test]
    fn running_batches_ignore_broken_newcomers() {
        let mut reg = registry(&[("a", &[]), ("b", &["a"]), ("late", &["ghost"])]);
        reg.register("loop", noop(), ["loop"]).unwrap();
        reg.set_state("a", crate::components::ComponentState::Running, None);
        reg.set_state("b", crate::components::ComponentState::Running, None);

        assert!(schedule(&reg).is_err());
        assert_eq!(
            schedule_running(&reg).unwrap(),
            batches(&[&["a"], &["b"]])
        );
    }

    #[test]
    fn empty_registry_has_no_batches() {
        assert!(schedule(&Registry::new()).unwrap().is_empty());
    }

    #[test]
    fn validation_errors_propagate() {
        let reg = registry(&[("x", &["y"]), ("y", &["x"])]);
        assert!(matches!(
            schedule(&reg),
            Err(OrchestratorError::CycleDetected { .. })
        ));
    }

    /// Random DAG: node `i` may only depend on nodes with a smaller index.
    fn dag() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
        (1usize..40).prop_flat_map(|n| {
            proptest::collection::vec(proptest::collection::vec(any::<prop::sample::Index>(), 0..4), n)
                .prop_map(move |picks| {
                    picks
                        .into_iter()
                        .enumerate()
                        .map(|(i, deps)| {
                            let deps = if i == 0 {
                                Vec::new()
                            } else {
                                deps.into_iter()
                                    .map(|ix| format!("c{:02}", ix.index(i)))
                                    .collect()
                            };
                            (format!("c{i:02}"), deps)
                        })
                        .collect()
                })
        })
    }

    fn build(nodes: &[(String, Vec<String>)]) -> Registry {
        let mut reg = Registry::new();
        for (id, deps) in nodes {
            reg.register(id.clone(), noop(), deps.clone()).unwrap();
        }
        reg
    }

    proptest! {
        #[test]
        fn batches_respect_dependencies(nodes in dag()) {
            let reg = build(&nodes);
            let out = schedule(&reg).unwrap();

            let mut level = HashMap::new();
            for (n, batch) in out.iter().enumerate() {
                let mut sorted = batch.clone();
                sorted.sort();
                prop_assert_eq!(&sorted, batch);
                for id in batch {
                    prop_assert!(level.insert(id.clone(), n).is_none(), "{} placed twice", id);
                }
            }
            prop_assert_eq!(level.len(), nodes.len());

            for (id, deps) in &nodes {
                let mine = level[id];
                let mut earliest = 0;
                for dep in deps {
                    prop_assert!(level[dep] < mine, "{} in batch {} but dep {} in {}", id, mine, dep, level[dep]);
                    earliest = earliest.max(level[dep] + 1);
                }
                prop_assert_eq!(mine, earliest, "{} not placed at its earliest batch", id);
            }

            prop_assert_eq!(schedule(&reg).unwrap(), out);
        }

        #[test]
        fn closing_a_loop_is_always_rejected(nodes in dag(), len in 2usize..6) {
            let mut nodes = nodes;
            let len = len.min(nodes.len());
            prop_assume!(len >= 2);
            // chain c00 ← c01 ← ... then make c00 depend on the last link
            for i in 1..len {
                let prev = nodes[i - 1].0.clone();
                nodes[i].1.push(prev);
            }
            let last = nodes[len - 1].0.clone();
            nodes[0].1.push(last);

            let reg = build(&nodes);
            match schedule(&reg) {
                Err(OrchestratorError::CycleDetected { path }) => {
                    prop_assert!(path.len() >= 3);
                    prop_assert_eq!(path.first(), path.last());
                    let distinct: BTreeSet<_> = path[..path.len() - 1].iter().collect();
                    prop_assert_eq!(distinct.len(), path.len() - 1);
                }
                other => prop_assert!(false, "expected cycle, got {:?}", other),
            }
        }
    }
}
