//! Snapshot encoding and the file-backed snapshot store.
//!
//! A snapshot is the full todo sequence as a JSON array of
//! `{id, text, completed}` objects. [`FileSnapshotStore`] keeps any number of
//! such blobs in one JSON object file, keyed by name.

use crate::types::Todo;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use todolist_core::snapshot::{SnapshotError, SnapshotStore};
use tokio::sync::Mutex;

/// Serializes the todo sequence into its snapshot form
///
/// # Errors
///
/// Returns [`SnapshotError::Serialization`] if serde rejects the value.
pub fn encode(todos: &[Todo]) -> Result<String, SnapshotError> {
    serde_json::to_string(todos).map_err(|error| SnapshotError::Serialization(error.to_string()))
}

/// Parses a snapshot back into the todo sequence, verbatim
///
/// # Errors
///
/// Returns [`SnapshotError::Serialization`] if the blob is not a JSON array of
/// todos.
pub fn decode(blob: &str) -> Result<Vec<Todo>, SnapshotError> {
    serde_json::from_str(blob).map_err(|error| SnapshotError::Serialization(error.to_string()))
}

/// Snapshot store persisted as a single JSON file
///
/// The file holds one object mapping keys to blobs. A missing or empty file
/// is an empty store. Saves rewrite the whole file through a temporary
/// sibling and a rename, serialized within the process. A file that does not
/// decode fails loads but is replaced by the next save.
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSnapshotStore {
    /// Creates a store backed by `path`; nothing is touched until first use
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, SnapshotError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|error| {
                SnapshotError::Serialization(format!("{}: {error}", self.path.display()))
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SnapshotError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|error| SnapshotError::Serialization(error.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, SnapshotError>> {
        Box::pin(async move {
            let mut entries = self.read_entries().await?;
            Ok(entries.remove(key))
        })
    }

    fn save<'a>(&'a self, key: &'a str, blob: String) -> BoxFuture<'a, Result<(), SnapshotError>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let mut entries = match self.read_entries().await {
                Ok(entries) => entries,
                Err(SnapshotError::Serialization(reason)) => {
                    tracing::warn!(%reason, "Replacing undecodable snapshot file");
                    BTreeMap::new()
                }
                Err(error) => return Err(error),
            };
            entries.insert(key.to_string(), blob);
            self.write_entries(&entries).await?;

            tracing::trace!(path = %self.path.display(), key, "Snapshot written");
            Ok(())
        })
    }
}
