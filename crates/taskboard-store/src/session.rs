//! Session marker for the signed-in user
//!
//! A single current-username value with session lifetime. It is never
//! written through the adapter; closing the session discards it. The UI
//! layer reads it to decide which panel renders and attaches it to
//! subsequent store calls.

use crate::users::authenticate;
use std::sync::{Arc, Mutex};
use taskboard_core::User;

/// Holder of the current-user marker
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<Mutex<Option<String>>>,
}

impl SessionStore {
    /// Create an empty session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify credentials and set the marker on success
    ///
    /// Comparison is exact-match on username and plain-text password (see
    /// the project non-goals). A failed attempt leaves any existing marker
    /// untouched.
    pub fn sign_in(&self, users: &[User], username: &str, password: &str) -> bool {
        if authenticate(users, username, password).is_none() {
            return false;
        }
        if let Ok(mut current) = self.current.lock() {
            *current = Some(username.to_string());
        }
        true
    }

    /// The signed-in username, if any
    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    /// Clear the marker
    pub fn sign_out(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}
