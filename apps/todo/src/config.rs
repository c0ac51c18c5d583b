//! Configuration management for the todo front-end.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the snapshot file
pub const DEFAULT_STORAGE_PATH: &str = ".todo/storage.json";

/// Default key the todo sequence is stored under
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Snapshot storage configuration
    pub storage: StorageConfig,
    /// Seconds to wait for pending snapshot writes on exit
    pub shutdown_timeout: u64,
    /// Log filter directives (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File holding the key-value blobs
    pub path: PathBuf,
    /// Key the todo sequence is saved under
    pub key: String,
    /// Whether changes are persisted at all
    pub persist: bool,
}

impl TodoConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TODO_STORAGE_PATH` | `.todo/storage.json` |
    /// | `TODO_STORAGE_KEY` | `todos` |
    /// | `TODO_PERSIST` | `true` |
    /// | `TODO_SHUTDOWN_TIMEOUT` | `5` |
    /// | `RUST_LOG` | `todo=info,todolist_runtime=info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            storage: StorageConfig {
                path: lookup("TODO_STORAGE_PATH")
                    .filter(|path| !path.is_empty())
                    .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
                key: lookup("TODO_STORAGE_KEY")
                    .filter(|key| !key.is_empty())
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
                persist: lookup("TODO_PERSIST")
                    .and_then(|s| parse_flag(&s))
                    .unwrap_or(true),
            },
            shutdown_timeout: lookup("TODO_SHUTDOWN_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            log_level: lookup("RUST_LOG")
                .unwrap_or_else(|| "todo=info,todolist_runtime=info".to_string()),
        }
    }

    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TodoConfig::default();

        assert_eq!(config.storage.path, PathBuf::from(".todo/storage.json"));
        assert_eq!(config.storage.key, "todos");
        assert!(config.storage.persist);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level, "todo=info,todolist_runtime=info");
    }

    #[test]
    fn test_overrides() {
        let config = TodoConfig::from_lookup(lookup_from(&[
            ("TODO_STORAGE_PATH", "/tmp/todos.json"),
            ("TODO_STORAGE_KEY", "work"),
            ("TODO_PERSIST", "off"),
            ("TODO_SHUTDOWN_TIMEOUT", "12"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.storage.path, PathBuf::from("/tmp/todos.json"));
        assert_eq!(config.storage.key, "work");
        assert!(!config.storage.persist);
        assert_eq!(config.shutdown_timeout, 12);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = TodoConfig::from_lookup(lookup_from(&[
            ("TODO_PERSIST", "maybe"),
            ("TODO_SHUTDOWN_TIMEOUT", "soon"),
            ("TODO_STORAGE_KEY", ""),
        ]));

        assert!(config.storage.persist);
        assert_eq!(config.shutdown_timeout, 5);
        assert_eq!(config.storage.key, "todos");
    }
}
