//! Front-end error type.

use crate::types::ActionError;
use thiserror::Error;
use todolist_core::snapshot::SnapshotError;
use todolist_runtime::StoreError;

/// Errors surfaced by [`crate::app::TodoApp`]
#[derive(Error, Debug)]
pub enum AppError {
    /// The add input was blank after trimming
    #[error("Input field is empty")]
    EmptyInput,

    /// A wire action could not be decoded
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The snapshot store failed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The store rejected the action or timed out shutting down
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Whether the user can simply try again
    ///
    /// Only input validation is recoverable; everything else is a broken
    /// contract or a broken environment.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }
}
