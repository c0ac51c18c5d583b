//! A reducer-driven todo list.
//!
//! The list is an ordered sequence of [`Todo`]s. Every change is a
//! [`TodoAction`] run through [`TodoReducer`]: the reducer computes the next
//! [`TodoListState`] and, when the list changed, describes a snapshot save as
//! an effect. [`TodoApp`] is the thin controller a front-end talks to; the
//! `todo` binary wraps it in a CLI and an interactive shell.
//!
//! - Add, delete, toggle and bulk-replace transitions
//! - Blank input rejected before any transition
//! - Snapshots restored at start-up and saved after every change
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo::{TodoApp, TodoEnvironment, TodoListState};
//! use todolist_core::environment::{ClockIdGenerator, SystemClock};
//!
//! # async fn example() -> Result<(), todo::AppError> {
//! let app = TodoApp::new(
//!     TodoListState::seeded(),
//!     TodoEnvironment::ephemeral(),
//!     Arc::new(ClockIdGenerator::new(Arc::new(SystemClock))),
//! );
//!
//! let todo = app.add("Water plants").await?;
//! app.toggle(todo.id).await?;
//!
//! for line in app.render().await {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod reducer;
pub mod snapshot;
pub mod types;

pub use app::{RestoreOutcome, TodoApp, TodoStore, render};
pub use config::TodoConfig;
pub use error::AppError;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use snapshot::FileSnapshotStore;
pub use types::{ActionError, SEED_TEXTS, Todo, TodoAction, TodoId, TodoListState, seed_todos};
