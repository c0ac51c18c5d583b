//! Reducer logic for the todo list.
//!
//! The reducer replaces the state with [`TodoListState::transition`] and,
//! whenever the list actually changed, describes a snapshot save as an
//! effect. It never performs I/O itself. A failed save does not undo the
//! transition; it is parked in [`Persistence`] for the caller to collect.

use crate::snapshot;
use crate::types::{TodoAction, TodoListState};
use std::sync::{Arc, Mutex, PoisonError};
use todolist_core::{
    SmallVec,
    effect::Effect,
    reducer::Reducer,
    smallvec,
    snapshot::{SnapshotError, SnapshotStore},
};

/// Where snapshots go
#[derive(Clone)]
pub struct Persistence {
    /// Backing blob store
    pub store: Arc<dyn SnapshotStore>,
    /// Key the todo sequence is saved under
    pub key: String,
    failure: Arc<Mutex<Option<SnapshotError>>>,
}

impl Persistence {
    /// Takes the error of the latest failed save, if one is pending
    #[must_use]
    pub fn take_failure(&self) -> Option<SnapshotError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn record_failure(&self, error: SnapshotError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone, Debug, Default)]
pub struct TodoEnvironment {
    persistence: Option<Persistence>,
}

impl TodoEnvironment {
    /// Persist every change to `store` under `key`
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        Self {
            persistence: Some(Persistence {
                store,
                key: key.into(),
                failure: Arc::new(Mutex::new(None)),
            }),
        }
    }

    /// Keep the list in memory only
    #[must_use]
    pub const fn ephemeral() -> Self {
        Self { persistence: None }
    }

    /// The configured persistence, if any
    #[must_use]
    pub const fn persistence(&self) -> Option<&Persistence> {
        self.persistence.as_ref()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Describes saving the current list, if persistence is configured
    fn persist(state: &TodoListState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let Some(persistence) = env.persistence.clone() else {
            return Effect::None;
        };

        let blob = match snapshot::encode(&state.todos) {
            Ok(blob) => blob,
            Err(error) => {
                tracing::warn!(%error, "Could not encode snapshot");
                return Effect::None;
            }
        };

        Effect::fire_and_forget(async move {
            match persistence.store.save(&persistence.key, blob).await {
                Ok(()) => tracing::trace!(key = %persistence.key, "Snapshot saved"),
                Err(error) => {
                    tracing::warn!(key = %persistence.key, %error, "Failed to save snapshot");
                    persistence.record_failure(error);
                }
            }
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodoListState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let kind = action.kind();
        let next = state.transition(action);

        if next == *state {
            tracing::debug!(kind, "Todo list unchanged");
            return smallvec![Effect::None];
        }

        *state = next;
        tracing::debug!(
            kind,
            todos = state.len(),
            completed = state.completed_count(),
            "Applied transition"
        );

        smallvec![Self::persist(state, env)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Todo, TodoId};
    use todolist_testing::{InMemorySnapshotStore, ReducerTest, assertions};

    fn persisting_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(InMemorySnapshotStore::new()), "todos")
    }

    fn id_of(state: &TodoListState, text: &str) -> TodoId {
        state
            .todos
            .iter()
            .find(|todo| todo.text == text)
            .map(|todo| todo.id)
            .unwrap()
    }

    #[test]
    fn test_add_todo_persists() {
        let todo = Todo::new(TodoId::new(1_735_689_600_000), "Read a book");
        let expected = todo.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(TodoListState::seeded())
            .when_action(TodoAction::AddTodo(todo))
            .then_state(move |state| {
                assert_eq!(state.len(), 6);
                assert_eq!(state.todos.last(), Some(&expected));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_delete_absent_id_skips_persistence() {
        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(TodoListState::seeded())
            .when_action(TodoAction::DeleteTodo { id: TodoId::new(404) })
            .then_state(|state| {
                assert_eq!(*state, TodoListState::seeded());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_absent_id_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(TodoListState::seeded())
            .when_action(TodoAction::ToggleTodo { id: TodoId::new(404) })
            .then_state(|state| {
                assert_eq!(state.completed_count(), 0);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_ephemeral_environment_never_persists() {
        ReducerTest::new(TodoReducer::new())
            .with_env(TodoEnvironment::ephemeral())
            .given_state(TodoListState::seeded())
            .when_action(TodoAction::SetTodos(Vec::new()))
            .then_state(|state| {
                assert!(state.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_seed_scenario() {
        let seed = TodoListState::seeded();
        let walk_the_dog = id_of(&seed, "Walk the dog");
        let groceries = id_of(&seed, "Buy groceries");

        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(seed)
            .when_action(TodoAction::AddTodo(Todo::new(TodoId::new(100), "Read a book")))
            .when_action(TodoAction::DeleteTodo { id: walk_the_dog })
            .when_action(TodoAction::ToggleTodo { id: groceries })
            .then_state(move |state| {
                assert_eq!(state.len(), 5);
                assert!(state.todos.iter().all(|todo| todo.text != "Walk the dog"));
                assert_eq!(state.todos.last().map(|todo| todo.text.as_str()), Some("Read a book"));
                assert!(state.get(groceries).is_some_and(|todo| todo.completed));
                assert_eq!(state.completed_count(), 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_persist_effect_writes_snapshot() {
        let store = InMemorySnapshotStore::new();
        let env = TodoEnvironment::new(Arc::new(store.clone()), "todos");
        let mut state = TodoListState::seeded();

        let effects = TodoReducer::new().reduce(
            &mut state,
            TodoAction::ToggleTodo { id: TodoId::new(1) },
            &env,
        );

        for effect in effects {
            if let Effect::Future(fut) = effect {
                assert!(fut.await.is_none());
            }
        }

        let saved = snapshot::decode(&store.get("todos").unwrap()).unwrap();
        assert_eq!(saved, state.todos);
        assert!(saved[0].completed);
    }

    #[tokio::test]
    async fn test_persist_failure_is_recorded() {
        let store = InMemorySnapshotStore::new();
        store.fail_operations(true);
        let env = TodoEnvironment::new(Arc::new(store.clone()), "todos");
        let mut state = TodoListState::seeded();

        let effects = TodoReducer::new().reduce(
            &mut state,
            TodoAction::DeleteTodo { id: TodoId::new(1) },
            &env,
        );

        for effect in effects {
            if let Effect::Future(fut) = effect {
                assert!(fut.await.is_none());
            }
        }

        assert_eq!(state.len(), 4);
        assert_eq!(store.save_count(), 0);

        let persistence = env.persistence().unwrap();
        assert!(matches!(
            persistence.take_failure(),
            Some(SnapshotError::Storage(_))
        ));
        assert_eq!(persistence.take_failure(), None);
    }
}
