//! In-memory snapshot storage for tests
//!
//! [`InMemorySnapshotStore`] keeps blobs in a `HashMap` and can be switched
//! into a failing mode to exercise persistence error paths.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use todolist_core::snapshot::{SnapshotError, SnapshotStore};

/// In-memory snapshot store for fast, deterministic testing.
///
/// Clones share the same data, so a test can keep one handle for assertions
/// while the environment owns another.
///
/// # Example
///
/// ```
/// use todolist_testing::InMemorySnapshotStore;
/// use todolist_core::snapshot::SnapshotStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemorySnapshotStore::new();
/// store.save("todos", "[]".to_string()).await?;
///
/// assert_eq!(store.get("todos").as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemorySnapshotStore {
    data: Arc<RwLock<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemorySnapshotStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one blob
    #[must_use]
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let store = Self::new();
        store.data.write().unwrap().insert(key.to_string(), blob.into());
        store
    }

    /// Make every subsequent load and save fail with [`SnapshotError::Storage`]
    pub fn fail_operations(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Read a blob synchronously (for assertions)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().unwrap().get(key).cloned()
    }

    /// Number of successful saves so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), SnapshotError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SnapshotError::Storage("in-memory store set to fail".to_string()));
        }
        Ok(())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, SnapshotError>> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.get(key))
        })
    }

    fn save<'a>(&'a self, key: &'a str, blob: String) -> BoxFuture<'a, Result<(), SnapshotError>> {
        Box::pin(async move {
            self.check_available()?;
            self.data.write().unwrap().insert(key.to_string(), blob);
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() -> Result<(), SnapshotError> {
        let store = InMemorySnapshotStore::new();
        assert_eq!(store.load("todos").await?, None);

        store.save("todos", "[1]".to_string()).await?;
        store.save("todos", "[2]".to_string()).await?;

        assert_eq!(store.load("todos").await?.as_deref(), Some("[2]"));
        assert_eq!(store.save_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_data() -> Result<(), SnapshotError> {
        let store = InMemorySnapshotStore::with_blob("todos", "[]");
        let observer = store.clone();

        store.save("other", "x".to_string()).await?;

        assert_eq!(observer.get("todos").as_deref(), Some("[]"));
        assert_eq!(observer.get("other").as_deref(), Some("x"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemorySnapshotStore::new();
        store.fail_operations(true);

        assert!(matches!(store.load("todos").await, Err(SnapshotError::Storage(_))));
        assert!(store.save("todos", "[]".to_string()).await.is_err());
        assert_eq!(store.save_count(), 0);

        store.fail_operations(false);
        assert!(store.save("todos", "[]".to_string()).await.is_ok());
    }
}
