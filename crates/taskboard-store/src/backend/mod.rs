//! Storage backends
//!
//! One `StorageBackend` implementation is selected at session start from the
//! configuration and injected into the stores; there is no global handle.
//! `RemoteBackend` talks to the hosted relational store, `LocalBackend`
//! serves the same interface from the adapter's blobs.

pub mod local;
pub mod remote;

use crate::adapter::StorageAdapter;
use async_trait::async_trait;
use std::sync::Arc;
use taskboard_core::{Task, TaskId, User};

pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Which backend implementation is serving a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted relational store
    Remote,
    /// Adapter-backed fallback
    Local,
}

impl BackendKind {
    /// Check for the remote implementation
    #[inline]
    #[must_use]
    pub fn is_remote(self) -> bool {
        matches!(self, BackendKind::Remote)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Why a backend call failed
///
/// Callers never propagate these to the UI layer; every call site degrades
/// the failing operation to local-only semantics.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (connect, send, decode body)
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for the log line
        body: String,
    },

    /// Persisted data failed to parse
    #[error("malformed stored data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Row-level access to the `users` and `tasks` collections
///
/// All operations are asynchronous and fallible; the stores own the policy
/// of what a failure degrades to.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which implementation this is
    fn kind(&self) -> BackendKind;

    /// All user rows, normalized to the canonical shape
    async fn select_users(&self) -> Result<Vec<User>, BackendError>;

    /// Insert new user rows
    async fn insert_users(&self, users: &[User]) -> Result<(), BackendError>;

    /// Insert-or-update user rows keyed on `username`
    async fn upsert_users(&self, users: &[User]) -> Result<(), BackendError>;

    /// Delete the user row for `username`
    async fn delete_user(&self, username: &str) -> Result<(), BackendError>;

    /// All task rows as (username, task) pairs in storage order
    async fn select_tasks(&self) -> Result<Vec<(String, Task)>, BackendError>;

    /// Insert one task row; returns the backend-assigned id when there is one
    async fn insert_task(
        &self,
        username: &str,
        task: &Task,
    ) -> Result<Option<TaskId>, BackendError>;

    /// Push a full-row update keyed on the task's id
    async fn update_task(&self, task: &Task) -> Result<(), BackendError>;

    /// Delete the task row with `id`
    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError>;
}

/// Connection settings for the remote backend
///
/// Both values must be present (and non-empty) for a remote connection to
/// be attempted; otherwise the session runs on local storage.
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Base URL of the hosted store
    pub url: Option<String>,
    /// API key, sent as both the `apikey` header and the bearer token
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// Configure a remote connection
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            api_key: Some(api_key.into()),
        }
    }

    /// Read `TASKBOARD_BACKEND_URL` / `TASKBOARD_BACKEND_KEY`
    ///
    /// Unset or empty variables leave the session on local storage.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            url: read("TASKBOARD_BACKEND_URL"),
            api_key: read("TASKBOARD_BACKEND_KEY"),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

/// Select the session's backend once, at startup
///
/// Remote is used iff credentials are configured and client construction
/// succeeds; any construction failure degrades to local storage.
#[must_use]
pub fn select_backend(
    config: &BackendConfig,
    adapter: Arc<StorageAdapter>,
) -> Arc<dyn StorageBackend> {
    if let Some((url, api_key)) = config.credentials() {
        match RemoteBackend::connect(url, api_key) {
            Ok(remote) => {
                tracing::info!("using remote backend at {url}");
                return Arc::new(remote);
            }
            Err(error) => {
                tracing::warn!("remote backend unavailable, using local storage: {error}");
            }
        }
    }
    tracing::info!("using local storage backend");
    Arc::new(LocalBackend::new(adapter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_both_credentials() {
        assert!(BackendConfig::default().credentials().is_none());
        assert!(BackendConfig {
            url: Some("https://example.test".to_string()),
            api_key: None,
        }
        .credentials()
        .is_none());
        assert!(BackendConfig {
            url: Some(String::new()),
            api_key: Some("key".to_string()),
        }
        .credentials()
        .is_none());
        assert!(BackendConfig::new("https://example.test", "key")
            .credentials()
            .is_some());
    }

    #[test]
    fn select_backend_without_credentials_is_local() {
        let adapter = Arc::new(StorageAdapter::new("unused-root"));
        let backend = select_backend(&BackendConfig::default(), adapter);
        assert_eq!(backend.kind(), BackendKind::Local);
    }
}
