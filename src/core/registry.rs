//! # Component registry - in-memory record store.
//!
//! Maps component id → [`ComponentRecord`] (handle, declared dependencies, state).
//! Pure data holder: no graph algorithm, no I/O, no locking of its own. The
//! [`Orchestrator`](crate::Orchestrator) keeps it behind a single lock and is the
//! only writer.
//!
//! ## Rules
//! - Ids are unique; re-registering an id fails without mutating anything
//! - Dependencies are **not** checked at registration (any registration order works);
//!   unknown ids and cycles are rejected later by graph validation
//! - A record can be removed only when it is at rest (`Created`/`Stopped`/`Error`)
//!   and no other record lists it as a dependency

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::components::{ComponentRef, ComponentState};
use crate::error::{ComponentError, OrchestratorError};

/// A registered component.
#[derive(Clone)]
pub struct ComponentRecord {
    id: String,
    handle: ComponentRef,
    dependencies: BTreeSet<String>,
    state: ComponentState,
    last_error: Option<ComponentError>,
}

impl ComponentRecord {
    fn new(id: String, handle: ComponentRef, dependencies: BTreeSet<String>) -> Self {
        Self {
            id,
            handle,
            dependencies,
            state: ComponentState::Created,
            last_error: None,
        }
    }

    /// Component id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared handle to the component.
    pub fn handle(&self) -> &ComponentRef {
        &self.handle
    }

    /// Declared dependency ids (sorted).
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Error that moved the component into [`ComponentState::Error`], if any.
    pub fn last_error(&self) -> Option<&ComponentError> {
        self.last_error.as_ref()
    }
}

impl fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

/// In-memory registry of components.
#[derive(Default)]
pub struct Registry {
    records: HashMap<String, ComponentRecord>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component in state `Created`.
    ///
    /// Fails with `AlreadyRegistered` if `id` is taken. The dependency set is stored as-is.
    pub fn register<I, S>(
        &mut self,
        id: impl Into<String>,
        handle: ComponentRef,
        dependencies: I,
    ) -> Result<(), OrchestratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        if self.records.contains_key(&id) {
            return Err(OrchestratorError::AlreadyRegistered { id });
        }
        let deps = dependencies.into_iter().map(Into::into).collect();
        self.records
            .insert(id.clone(), ComponentRecord::new(id, handle, deps));
        Ok(())
    }

    /// Removes a component and returns its record.
    ///
    /// ### Errors
    /// - `UnknownComponent` if `id` is not registered
    /// - `HasDependents` if another record still lists `id` as a dependency
    /// - `StillActive` if the component is initializing, running or stopping
    pub fn unregister(&mut self, id: &str) -> Result<ComponentRecord, OrchestratorError> {
        let state = self
            .records
            .get(id)
            .map(ComponentRecord::state)
            .ok_or_else(|| OrchestratorError::UnknownComponent { id: id.to_string() })?;

        let dependents = self.dependents_of(id);
        if !dependents.is_empty() {
            return Err(OrchestratorError::HasDependents {
                id: id.to_string(),
                dependents,
            });
        }
        if !state.is_removable() {
            return Err(OrchestratorError::StillActive {
                id: id.to_string(),
                state,
            });
        }

        self.records
            .remove(id)
            .ok_or_else(|| OrchestratorError::UnknownComponent { id: id.to_string() })
    }

    /// Returns a copy of the record for `id`.
    pub fn get(&self, id: &str) -> Option<ComponentRecord> {
        self.records.get(id).cloned()
    }

    /// Returns a clone of the handle for `id`.
    pub fn handle(&self, id: &str) -> Option<ComponentRef> {
        self.records.get(id).map(|r| r.handle.clone())
    }

    /// Returns the current state of `id`.
    pub fn state(&self, id: &str) -> Option<ComponentState> {
        self.records.get(id).map(ComponentRecord::state)
    }

    /// Snapshot of all records, sorted by id.
    pub fn list(&self) -> Vec<ComponentRecord> {
        let mut records: Vec<ComponentRecord> = self.records.values().cloned().collect();
        records.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Sorted list of registered ids.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of records that list `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        let mut dependents: Vec<String> = self
            .records
            .values()
            .filter(|r| r.id != id && r.dependencies.contains(id))
            .map(|r| r.id.clone())
            .collect();
        dependents.sort_unstable();
        dependents
    }

    /// Updates the state of `id`; `error` is kept only for [`ComponentState::Error`].
    ///
    /// Returns `false` if `id` is not registered.
    pub fn set_state(
        &mut self,
        id: &str,
        state: ComponentState,
        error: Option<ComponentError>,
    ) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.state = state;
                record.last_error = match state {
                    ComponentState::Error => error,
                    _ => None,
                };
                true
            }
            None => false,
        }
    }

    /// True if every registered component is running (vacuously true when empty).
    pub fn all_running(&self) -> bool {
        self.records.values().all(|r| r.state.is_running())
    }

    /// True if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.records.values()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::components::ComponentFn;

    pub(crate) fn noop() -> ComponentRef {
        ComponentFn::init_only(|| async { Ok::<_, ComponentError>(()) })
    }

    pub(crate) fn registry(edges: &[(&str, &[&str])]) -> Registry {
        let mut reg = Registry::new();
        for (id, deps) in edges {
            reg.register(*id, noop(), deps.iter().copied()).unwrap();
        }
        reg
    }

    #[test]
    fn duplicate_register_leaves_original_untouched() {
        let mut reg = registry(&[("a", &[])]);
        reg.set_state("a", ComponentState::Running, None);

        let err = reg.register("a", noop(), ["b"]).unwrap_err();

        assert_eq!(err, OrchestratorError::AlreadyRegistered { id: "a".into() });
        let record = reg.get("a").unwrap();
        assert!(record.dependencies().is_empty());
        assert_eq!(record.state(), ComponentState::Running);
    }

    #[test]
    fn register_accepts_unknown_dependencies() {
        let reg = registry(&[("b", &["a"]), ("a", &[])]);
        assert_eq!(reg.ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(reg.get("b").unwrap().state(), ComponentState::Created);
    }

    #[test]
    fn unregister_blocked_by_dependents() {
        let mut reg = registry(&[("a", &[]), ("b", &["a"]), ("c", &["a"])]);

        let err = reg.unregister("a").unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::HasDependents {
                id: "a".into(),
                dependents: vec!["b".into(), "c".into()],
            }
        );

        reg.unregister("b").unwrap();
        reg.unregister("c").unwrap();
        assert_eq!(reg.unregister("a").unwrap().id(), "a");
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_rejects_active_and_unknown() {
        let mut reg = registry(&[("a", &[])]);
        reg.set_state("a", ComponentState::Running, None);

        assert_eq!(
            reg.unregister("a").unwrap_err(),
            OrchestratorError::StillActive {
                id: "a".into(),
                state: ComponentState::Running,
            }
        );
        assert_eq!(
            reg.unregister("zzz").unwrap_err(),
            OrchestratorError::UnknownComponent { id: "zzz".into() }
        );

        reg.set_state("a", ComponentState::Error, Some(ComponentError::fail("x")));
        assert!(reg.unregister("a").is_ok());
    }

    #[test]
    fn last_error_only_kept_in_error_state() {
        let mut reg = registry(&[("a", &[])]);

        reg.set_state("a", ComponentState::Error, Some(ComponentError::fail("boom")));
        assert_eq!(
            reg.get("a").unwrap().last_error(),
            Some(&ComponentError::fail("boom"))
        );

        reg.set_state("a", ComponentState::Stopped, Some(ComponentError::fail("ignored")));
        assert_eq!(reg.get("a").unwrap().last_error(), None);
        assert!(!reg.set_state("missing", ComponentState::Stopped, None));
    }

    #[test]
    fn all_running_is_vacuous_on_empty() {
        let mut reg = Registry::new();
        assert!(reg.all_running());

        reg.register("a", noop(), Vec::<String>::new()).unwrap();
        assert!(!reg.all_running());
        reg.set_state("a", ComponentState::Running, None);
        assert!(reg.all_running());
    }
}
