//! Domain types for the todo list.
//!
//! A todo list is an ordered sequence of todo items. Every change goes
//! through [`TodoListState::transition`], which never mutates the current
//! state: it builds the next one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use todolist_macros::Action;

/// Texts of the list a fresh installation starts with
pub const SEED_TEXTS: [&str; 5] = [
    "Buy groceries",
    "Walk the dog",
    "Complete project report",
    "Call mom",
    "Read a book",
];

/// Unique identifier for a todo item
///
/// New ids are derived from the creation time in milliseconds; the seed list
/// uses the small ids `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TodoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a new, not yet completed, todo item
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Returns a copy with the completion flag flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// State of the todo list
///
/// Only the reducer replaces it; front-ends read snapshots and dispatch
/// [`TodoAction`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListState {
    /// Todos in display order
    pub todos: Vec<Todo>,
}

impl TodoListState {
    /// Creates a state holding exactly `todos`
    #[must_use]
    pub const fn new(todos: Vec<Todo>) -> Self {
        Self { todos }
    }

    /// Creates the seed list: five open todos with ids `1..=5`
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed_todos())
    }

    /// Computes the state that follows `action`
    ///
    /// - `AddTodo` appends the todo verbatim
    /// - `DeleteTodo` drops every todo with the id (absent id: unchanged)
    /// - `ToggleTodo` flips `completed` on matching todos only
    /// - `SetTodos` replaces the whole list without validating it
    #[must_use]
    pub fn transition(&self, action: TodoAction) -> Self {
        let todos = match action {
            TodoAction::AddTodo(todo) => {
                let mut todos = Vec::with_capacity(self.todos.len() + 1);
                todos.extend(self.todos.iter().cloned());
                todos.push(todo);
                todos
            }
            TodoAction::DeleteTodo { id } => self
                .todos
                .iter()
                .filter(|todo| todo.id != id)
                .cloned()
                .collect(),
            TodoAction::ToggleTodo { id } => self
                .todos
                .iter()
                .map(|todo| if todo.id == id { todo.toggled() } else { todo.clone() })
                .collect(),
            TodoAction::SetTodos(todos) => todos,
        };

        Self { todos }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    /// Returns true when the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    /// Returns the first todo with this id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Checks if a todo with this id exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }
}

/// The seed list as owned todos
#[must_use]
pub fn seed_todos() -> Vec<Todo> {
    (1_i64..)
        .zip(SEED_TEXTS)
        .map(|(id, text)| Todo::new(TodoId::new(id), text))
        .collect()
}

/// Actions accepted by the todo list
///
/// The wire form is `{"type": <kind>, "payload": ...}`:
///
/// ```json
/// {"type": "addTodo", "payload": {"id": 1735689600000, "text": "Read a book", "completed": false}}
/// {"type": "deleteTodo", "payload": {"id": 2}}
/// {"type": "toggleTodo", "payload": {"id": 1}}
/// {"type": "setTodos", "payload": []}
/// ```
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TodoAction {
    /// Append a fully formed todo
    AddTodo(Todo),

    /// Remove every todo with this id
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Flip the completion flag of the todo with this id
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Replace the whole list
    SetTodos(Vec<Todo>),
}

/// Errors decoding an action from its wire form
///
/// Every variant means the caller broke the dispatch contract; none of them
/// is a user-input condition.
#[derive(Error, Debug)]
pub enum ActionError {
    /// Not a JSON object with a string `type` field
    #[error("Malformed action: {0}")]
    Malformed(String),

    /// The `type` names no known action
    #[error("Unknown action kind \"{kind}\" (expected one of: {expected})", expected = TodoAction::KINDS.join(", "))]
    UnknownKind {
        /// The kind that was sent
        kind: String,
    },

    /// The kind is known but its payload does not fit
    #[error("Invalid payload for {kind}: {reason}")]
    Payload {
        /// The action kind
        kind: &'static str,
        /// What serde rejected
        reason: String,
    },
}

impl TodoAction {
    /// Decodes an action from its JSON wire form
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownKind`] when `type` names no action, and
    /// [`ActionError::Malformed`] / [`ActionError::Payload`] for input that is
    /// not shaped like an action.
    pub fn from_json(raw: &str) -> Result<Self, ActionError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|error| ActionError::Malformed(error.to_string()))?;

        let kind = match value.get("type").and_then(serde_json::Value::as_str) {
            Some(kind) => Self::KINDS
                .iter()
                .copied()
                .find(|known| *known == kind)
                .ok_or_else(|| ActionError::UnknownKind {
                    kind: kind.to_string(),
                })?,
            None => {
                return Err(ActionError::Malformed(
                    "missing string \"type\" field".to_string(),
                ));
            }
        };

        serde_json::from_value(value).map_err(|error| ActionError::Payload {
            kind,
            reason: error.to_string(),
        })
    }
}
