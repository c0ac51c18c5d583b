//! Snapshot storage abstraction.
//!
//! A snapshot store is a small key-value blob store: each key holds one
//! serialized blob (typically JSON) that is written in full on every save and
//! read back verbatim on start-up.
//!
//! # Implementations
//!
//! - `FileSnapshotStore` (in the `todo` crate): JSON file on disk
//! - `InMemorySnapshotStore` (in `todolist-testing`): `HashMap`-backed, for tests
//!
//! # Example
//!
//! ```no_run
//! use todolist_core::snapshot::{SnapshotError, SnapshotStore};
//!
//! async fn example(store: &dyn SnapshotStore) -> Result<(), SnapshotError> {
//!     store.save("todos", "[]".to_string()).await?;
//!     let blob = store.load("todos").await?;
//!     assert_eq!(blob.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur while reading or writing snapshots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A stored blob (or the container holding it) could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing store refused the operation.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for SnapshotError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Key-value blob store used to persist state snapshots.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of `impl Future` so the store can be
/// held as `Arc<dyn SnapshotStore>` and captured by effects.
pub trait SnapshotStore: Send + Sync {
    /// Load the blob stored under `key`, or `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the backing store cannot be read.
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, SnapshotError>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the blob cannot be written.
    fn save<'a>(&'a self, key: &'a str, blob: String) -> BoxFuture<'a, Result<(), SnapshotError>>;
}
