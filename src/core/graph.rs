//! # Dependency graph validation.
//!
//! Builds an arena-indexed view of the registry (ids sorted lexicographically and
//! numbered `0..n`, edges as index lists) and checks it before any component runs.
//!
//! ## Checks
//! 1. **Unknown dependencies**: every declared dependency must be registered.
//!    The first offender in sorted order is reported as `UnknownDependency`.
//! 2. **Cycles**: three-color DFS over "depends on" edges, iterative with an explicit
//!    stack. Reaching a gray node (one on the current DFS path) closes a cycle; the
//!    error carries the path with the first id repeated at the end.
//!
//! ```text
//! x → y → x        CycleDetected { path: [x, y, x] }
//! a → a            CycleDetected { path: [a, a] }
//! ```
//!
//! Validation is a pure function of the registry snapshot.

use std::collections::HashMap;

use crate::core::registry::Registry;
use crate::error::OrchestratorError;

/// DFS node color.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Arena-indexed dependency graph: edge `a → b` means "a depends on b".
#[derive(Debug, Clone)]
pub(crate) struct DependencyGraph {
    ids: Vec<String>,
    deps: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Builds the graph; fails on the first dependency that is not registered.
    pub(crate) fn build(registry: &Registry) -> Result<Self, OrchestratorError> {
        let ids = registry.ids();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut deps = vec![Vec::new(); ids.len()];
        let mut records: Vec<_> = registry.records().collect();
        records.sort_unstable_by(|a, b| a.id().cmp(b.id()));

        for record in records {
            let from = index[record.id()];
            for dep in record.dependencies() {
                match index.get(dep.as_str()) {
                    Some(&to) => deps[from].push(to),
                    None => {
                        return Err(OrchestratorError::UnknownDependency {
                            id: record.id().to_string(),
                            missing: dep.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { ids, deps })
    }

    /// Builds the graph of `Running` components only.
    ///
    /// Edges to components outside that set are dropped. Every running component was
    /// validated when it started and its dependencies cannot change afterwards, so this
    /// view stays usable after later registrations broke the full graph.
    pub(crate) fn running(registry: &Registry) -> Self {
        let mut records: Vec<_> = registry
            .records()
            .filter(|r| r.state().is_running())
            .collect();
        records.sort_unstable_by(|a, b| a.id().cmp(b.id()));

        let ids: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let deps = records
            .iter()
            .map(|r| {
                r.dependencies()
                    .iter()
                    .filter_map(|dep| index.get(dep.as_str()).copied())
                    .collect()
            })
            .collect();

        Self { ids, deps }
    }

    /// Number of nodes.
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    /// Id of node `i`.
    pub(crate) fn id(&self, i: usize) -> &str {
        &self.ids[i]
    }

    /// Dependencies of node `i`.
    pub(crate) fn deps(&self, i: usize) -> &[usize] {
        &self.deps[i]
    }

    /// Fails with `CycleDetected` if any node can reach itself.
    pub(crate) fn check_acyclic(&self) -> Result<(), OrchestratorError> {
        let mut color = vec![Color::White; self.len()];
        // (node, index of the next dependency to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.len() {
            if color[root] != Color::White {
                continue;
            }
            color[root] = Color::Gray;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                match self.deps[node].get(next).copied() {
                    Some(dep) => {
                        top.1 += 1;
                        match color[dep] {
                            Color::White => {
                                color[dep] = Color::Gray;
                                stack.push((dep, 0));
                            }
                            Color::Gray => return Err(self.cycle_error(&stack, dep)),
                            Color::Black => {}
                        }
                    }
                    None => {
                        color[node] = Color::Black;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    /// Cycle path from `entry` down the current DFS stack and back to `entry`.
    fn cycle_error(&self, stack: &[(usize, usize)], entry: usize) -> OrchestratorError {
        let start = stack
            .iter()
            .position(|&(node, _)| node == entry)
            .unwrap_or(0);
        let mut path: Vec<String> = stack[start..]
            .iter()
            .map(|&(node, _)| self.ids[node].clone())
            .collect();
        path.push(self.ids[entry].clone());
        OrchestratorError::CycleDetected { path }
    }
}

/// Validates the registry's dependency graph: no unknown ids, no cycles.
pub fn validate(registry: &Registry) -> Result<(), OrchestratorError> {
    DependencyGraph::build(registry)?.check_acyclic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::tests::registry;

    #[test]
    fn diamond_is_valid() {
        let reg = registry(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
        assert!(validate(&reg).is_ok());
    }

    #[test]
    fn two_node_cycle_reports_full_path() {
        let reg = registry(&[("x", &["y"]), ("y", &["x"])]);
        assert_eq!(
            validate(&reg).unwrap_err(),
            OrchestratorError::CycleDetected {
                path: vec!["x".into(), "y".into(), "x".into()],
            }
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let reg = registry(&[("a", &["a"])]);
        assert_eq!(
            validate(&reg).unwrap_err(),
            OrchestratorError::CycleDetected {
                path: vec!["a".into(), "a".into()],
            }
        );
    }

    #[test]
    fn cycle_path_excludes_the_tail_leading_into_it() {
        // a → b → c → d → b
        let reg = registry(&[("a", &["b"]), ("b", &["c"]), ("c", &["d"]), ("d", &["b"])]);
        assert_eq!(
            validate(&reg).unwrap_err(),
            OrchestratorError::CycleDetected {
                path: vec!["b".into(), "c".into(), "d".into(), "b".into()],
            }
        );
    }

    #[test]
    fn unknown_dependency_reported_before_cycles() {
        let reg = registry(&[("a", &["a"]), ("b", &["ghost"])]);
        assert_eq!(
            validate(&reg).unwrap_err(),
            OrchestratorError::UnknownDependency {
                id: "b".into(),
                missing: "ghost".into(),
            }
        );
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let ids: Vec<String> = (0..50_000).map(|i| format!("n{i:05}")).collect();
        let mut reg = Registry::new();
        for (i, id) in ids.iter().enumerate() {
            let deps: Vec<String> = ids.get(i + 1).cloned().into_iter().collect();
            reg.register(id.clone(), crate::core::registry::tests::noop(), deps)
                .unwrap();
        }
        assert!(validate(&reg).is_ok());
    }
}
