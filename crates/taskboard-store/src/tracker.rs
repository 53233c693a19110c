//! Startup wiring
//!
//! Builds the adapter, selects the backend once from the configuration, and
//! hands out the injected stores. This is the only place a backend is
//! chosen; everything downstream receives it explicitly.

use crate::adapter::StorageAdapter;
use crate::backend::{select_backend, BackendConfig, BackendKind, StorageBackend};
use crate::session::SessionStore;
use crate::tasks::TaskStore;
use crate::users::UserStore;
use std::path::PathBuf;
use std::sync::Arc;

/// A connected tracker session
pub struct Tracker {
    adapter: Arc<StorageAdapter>,
    backend: Arc<dyn StorageBackend>,
    users: UserStore,
    session: SessionStore,
}

impl Tracker {
    /// Wire up a session with storage rooted at `storage_root`
    #[must_use]
    pub fn connect(config: &BackendConfig, storage_root: impl Into<PathBuf>) -> Self {
        let adapter = Arc::new(StorageAdapter::new(storage_root));
        let backend = select_backend(config, adapter.clone());
        let users = UserStore::new(backend.clone(), adapter.clone());
        Self {
            adapter,
            backend,
            users,
            session: SessionStore::new(),
        }
    }

    /// The user store
    #[inline]
    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// The task store
    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &TaskStore {
        self.users.tasks()
    }

    /// The session marker store
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Which backend implementation this session selected
    #[inline]
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The local storage adapter
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &StorageAdapter {
        &self.adapter
    }
}
