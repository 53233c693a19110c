//! Best-effort local persistence
//!
//! Uniform get/set of opaque string blobs over two mechanisms:
//! - primary: one file per key under a root directory
//! - fallback: a single JSON object blob held in process memory for the
//!   session, used whenever the primary is unavailable or a file
//!   operation fails unexpectedly
//!
//! Every operation swallows failures; persistence here is a durability
//! floor, never a reason to fail the caller.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const PROBE_KEY: &str = "__storage_probe__";

/// Dual-mechanism blob store
#[derive(Debug)]
pub struct StorageAdapter {
    root: PathBuf,
    /// Session-scoped fallback: a JSON object of key → value
    fallback: Mutex<String>,
}

impl StorageAdapter {
    /// Create an adapter rooted at `root`; the directory is created lazily
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback: Mutex::new(String::new()),
        }
    }

    /// Storage root for the primary mechanism
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Probe the primary mechanism by writing and removing a sentinel key
    ///
    /// Returns false on any failure (including denied access), never panics.
    #[must_use]
    pub fn is_available(&self) -> bool {
        if fs::create_dir_all(&self.root).is_err() {
            return false;
        }
        let probe = self.root.join(PROBE_KEY);
        if fs::write(&probe, PROBE_KEY).is_err() {
            return false;
        }
        fs::remove_file(&probe).is_ok()
    }

    /// Read the blob stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        if self.is_available() {
            match fs::read_to_string(self.root.join(key)) {
                Ok(value) => return Some(value),
                Err(error) if error.kind() == ErrorKind::NotFound => return None,
                Err(error) => {
                    tracing::debug!("primary read of {key} failed, trying fallback: {error}");
                }
            }
        }
        self.fallback_map().and_then(|mut map| map.remove(key))
    }

    /// Write (or with `None`, delete) the blob stored under `key`
    pub fn set(&self, key: &str, value: Option<&str>) {
        if self.is_available() {
            let path = self.root.join(key);
            let outcome = match value {
                Some(value) => fs::write(&path, value),
                None => match fs::remove_file(&path) {
                    Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            match outcome {
                Ok(()) => return,
                Err(error) => {
                    tracing::debug!("primary write of {key} failed, trying fallback: {error}");
                }
            }
        }

        let Ok(mut guard) = self.fallback.lock() else {
            return;
        };
        let mut map: BTreeMap<String, String> = if guard.is_empty() {
            BTreeMap::new()
        } else {
            match serde_json::from_str(&guard) {
                Ok(map) => map,
                Err(error) => {
                    tracing::debug!("fallback blob unreadable, dropping write of {key}: {error}");
                    return;
                }
            }
        };
        match value {
            Some(value) => {
                map.insert(key.to_string(), value.to_string());
            }
            None => {
                map.remove(key);
            }
        }
        if let Ok(raw) = serde_json::to_string(&map) {
            *guard = raw;
        }
    }

    fn fallback_map(&self) -> Option<BTreeMap<String, String>> {
        let guard = self.fallback.lock().ok()?;
        if guard.is_empty() {
            return None;
        }
        match serde_json::from_str(&guard) {
            Ok(map) => Some(map),
            Err(error) => {
                tracing::debug!("fallback blob unreadable: {error}");
                None
            }
        }
    }
}
