//! The todo controller.
//!
//! [`TodoApp`] sits between a front-end and the [`Store`]: it validates input,
//! mints ids, dispatches actions and waits for their persistence effects, and
//! renders the current list.

use crate::config::TodoConfig;
use crate::error::AppError;
use crate::reducer::{Persistence, TodoEnvironment, TodoReducer};
use crate::snapshot::{self, FileSnapshotStore};
use crate::types::{Todo, TodoAction, TodoId, TodoListState, seed_todos};
use std::sync::Arc;
use std::time::Duration;
use todolist_core::environment::{ClockIdGenerator, IdGenerator, SystemClock};
use todolist_runtime::Store;

/// Store specialised for the todo list
pub type TodoStore = Store<TodoListState, TodoAction, TodoEnvironment, TodoReducer>;

/// What [`TodoApp::restore`] found
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A snapshot was loaded and dispatched as `setTodos`
    Restored {
        /// Number of restored todos
        count: usize,
    },
    /// Nothing was stored (or persistence is off); the current list stays and,
    /// when persisting, becomes the first snapshot
    Seeded,
    /// The stored blob did not decode; the seed list stays
    Malformed {
        /// Decoder message
        reason: String,
    },
    /// The store could not be read; the seed list stays
    Unavailable {
        /// Store error message
        reason: String,
    },
}

/// Controller for one todo list
pub struct TodoApp {
    store: TodoStore,
    ids: Arc<dyn IdGenerator>,
    shutdown_timeout: Duration,
}

impl TodoApp {
    /// Creates a controller over `initial`
    #[must_use]
    pub fn new(initial: TodoListState, env: TodoEnvironment, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store: Store::new(initial, TodoReducer::new(), env),
            ids,
            shutdown_timeout: Duration::from_secs(5),
        }
    }

    /// Overrides how long [`TodoApp::finish`] waits for pending writes
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Builds the seeded controller described by `config`
    ///
    /// Snapshots go to a [`FileSnapshotStore`] unless persistence is off; ids
    /// come from the wall clock.
    #[must_use]
    pub fn from_config(config: &TodoConfig) -> Self {
        let env = if config.storage.persist {
            TodoEnvironment::new(
                Arc::new(FileSnapshotStore::new(&config.storage.path)),
                config.storage.key.clone(),
            )
        } else {
            TodoEnvironment::ephemeral()
        };

        let ids = Arc::new(ClockIdGenerator::new(Arc::new(SystemClock)));

        Self::new(TodoListState::seeded(), env, ids)
            .with_shutdown_timeout(config.shutdown_timeout())
    }

    /// Loads the saved snapshot, if any, and dispatches it as `setTodos`
    ///
    /// When nothing is stored yet the current list is saved as the first
    /// snapshot. An unreadable or malformed snapshot leaves the current list
    /// in place and is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Snapshot`] if the first snapshot cannot be written,
    /// and [`AppError::Store`] if the store is shutting down.
    pub async fn restore(&self) -> Result<RestoreOutcome, AppError> {
        let Some(persistence) = self.store.environment().persistence() else {
            return Ok(RestoreOutcome::Seeded);
        };

        let blob = match persistence.store.load(&persistence.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                let todos = self.snapshot().await.todos;
                persistence
                    .store
                    .save(&persistence.key, snapshot::encode(&todos)?)
                    .await?;
                tracing::debug!(key = %persistence.key, "No snapshot stored, saved starting list");
                return Ok(RestoreOutcome::Seeded);
            }
            Err(error) => {
                tracing::warn!(key = %persistence.key, %error, "Snapshot unavailable, keeping seed list");
                return Ok(RestoreOutcome::Unavailable {
                    reason: error.to_string(),
                });
            }
        };

        match snapshot::decode(&blob) {
            Ok(todos) => {
                let count = todos.len();
                self.dispatch(TodoAction::SetTodos(todos)).await?;
                tracing::info!(key = %persistence.key, count, "Restored todo list");
                Ok(RestoreOutcome::Restored { count })
            }
            Err(error) => {
                tracing::warn!(key = %persistence.key, %error, "Malformed snapshot, keeping seed list");
                Ok(RestoreOutcome::Malformed {
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Adds a todo from raw user input
    ///
    /// The input is trimmed only to reject blanks; the text is stored as
    /// typed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyInput`] for blank input, with no transition.
    pub async fn add(&self, input: &str) -> Result<Todo, AppError> {
        if input.trim().is_empty() {
            tracing::debug!("Rejected blank todo");
            return Err(AppError::EmptyInput);
        }

        let id = self.fresh_id().await;
        let todo = Todo::new(id, input);
        self.dispatch(TodoAction::AddTodo(todo.clone())).await?;
        Ok(todo)
    }

    /// Deletes every todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn delete(&self, id: TodoId) -> Result<(), AppError> {
        self.dispatch(TodoAction::DeleteTodo { id }).await
    }

    /// Flips the completion flag of the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn toggle(&self, id: TodoId) -> Result<(), AppError> {
        self.dispatch(TodoAction::ToggleTodo { id }).await
    }

    /// Replaces the whole list
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn replace(&self, todos: Vec<Todo>) -> Result<(), AppError> {
        self.dispatch(TodoAction::SetTodos(todos)).await
    }

    /// Replaces the list with the seed list
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn reset(&self) -> Result<(), AppError> {
        self.replace(seed_todos()).await
    }

    /// Decodes and applies an action in its JSON wire form
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Action`] if the action does not decode; an unknown
    /// kind is never recoverable.
    pub async fn dispatch_json(&self, raw: &str) -> Result<TodoAction, AppError> {
        let action = TodoAction::from_json(raw)?;
        self.dispatch(action.clone()).await?;
        Ok(action)
    }

    /// Sends `action` and waits until its effects have finished
    ///
    /// Waiting keeps snapshot writes in the order of the transitions. A failed
    /// write does not roll the transition back, but it is reported.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down, and
    /// [`AppError::Snapshot`] if the new list could not be saved.
    pub async fn dispatch(&self, action: TodoAction) -> Result<(), AppError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;

        match self
            .store
            .environment()
            .persistence()
            .and_then(Persistence::take_failure)
        {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// Current list
    pub async fn snapshot(&self) -> TodoListState {
        self.store.state(TodoListState::clone).await
    }

    /// Current list as display lines
    pub async fn render(&self) -> Vec<String> {
        self.store.state(render).await
    }

    /// Waits for pending writes, then stops accepting actions
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if writes are still running at the timeout.
    pub async fn finish(&self) -> Result<(), AppError> {
        self.store.shutdown(self.shutdown_timeout).await?;
        Ok(())
    }

    async fn fresh_id(&self) -> TodoId {
        let ids = Arc::clone(&self.ids);
        self.store
            .state(move |state| {
                loop {
                    let id = TodoId::new(ids.next_id());
                    if !state.contains(id) {
                        return id;
                    }
                }
            })
            .await
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}

/// Renders `state` as a header line followed by one line per todo
#[must_use]
pub fn render(state: &TodoListState) -> Vec<String> {
    let mut lines = Vec::with_capacity(state.len() + 1);
    lines.push(format!(
        "Todo App  {} / {} completed",
        state.completed_count(),
        state.len()
    ));
    lines.extend(state.todos.iter().map(|todo| {
        let mark = if todo.completed { 'x' } else { ' ' };
        format!("[{mark}] {}  {}", todo.id, todo.text)
    }));
    lines
}
