//! User accounts
//!
//! Accounts are stored in several historical shapes (some without a role
//! field), so the stored form is kept separate from the canonical one and
//! normalized through a single rule.

use serde::{Deserialize, Serialize};

/// Reserved administrator account name
pub const ADMIN_USERNAME: &str = "admin";

/// Password given to accounts created through `add_user`
pub const DEFAULT_PASSWORD: &str = "1234";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Assigns tasks, confirms or rejects completion, manages accounts
    Admin,
    /// Receives tasks, marks them complete, attaches feedback
    User,
}

impl Role {
    /// Role assumed for a stored account with no usable role field:
    /// admin for the reserved administrator name, user otherwise.
    #[inline]
    #[must_use]
    pub fn default_for(username: &str) -> Self {
        if username == ADMIN_USERNAME {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Resolve a raw stored role, falling back to the defaulting rule
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>, username: &str) -> Self {
        match raw {
            Some("admin") => Role::Admin,
            Some("user") => Role::User,
            _ => Role::default_for(username),
        }
    }

    /// Check if this role is administrative
    #[inline]
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Wire/storage spelling
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// A user account
///
/// Passwords are stored and compared in plain text; see the project
/// non-goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, non-empty, trimmed account name
    pub username: String,
    /// Plain-text password
    pub password: String,
    /// Account role
    pub role: Role,
}

impl User {
    /// Create a new account
    #[inline]
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    /// Check if this account is an administrator
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A user record as it may appear in the persisted store or on the wire,
/// where the role column can be missing, null, or an unknown string
#[derive(Debug, Clone, Deserialize)]
pub struct StoredUser {
    /// Account name
    pub username: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
    /// Raw role value, if any
    #[serde(default)]
    pub role: Option<String>,
}

impl StoredUser {
    /// Resolve into the canonical shape
    #[must_use]
    pub fn normalize(self) -> User {
        let role = Role::parse_or_default(self.role.as_deref(), &self.username);
        User {
            username: self.username,
            password: self.password,
            role,
        }
    }
}

/// Accounts seeded on first load of an empty store
#[must_use]
pub fn default_users() -> Vec<User> {
    vec![
        User::new(ADMIN_USERNAME, "admin", Role::Admin),
        User::new("user1", "1234", Role::User),
        User::new("user2", "abcd", Role::User),
    ]
}

/// Count of administrator accounts
#[inline]
#[must_use]
pub fn admin_count(users: &[User]) -> usize {
    users.iter().filter(|u| u.is_admin()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_admin_only_for_admin_username() {
        assert_eq!(Role::default_for("admin"), Role::Admin);
        assert_eq!(Role::default_for("alice"), Role::User);
        assert_eq!(Role::default_for(""), Role::User);
    }

    #[test]
    fn role_parse_falls_back_on_unknown_values() {
        assert_eq!(Role::parse_or_default(Some("admin"), "alice"), Role::Admin);
        assert_eq!(Role::parse_or_default(Some("user"), "admin"), Role::User);
        assert_eq!(Role::parse_or_default(Some("owner"), "admin"), Role::Admin);
        assert_eq!(Role::parse_or_default(None, "bob"), Role::User);
    }

    #[test]
    fn stored_user_without_role_normalizes() {
        let raw = r#"{"username":"admin","password":"admin"}"#;
        let stored: StoredUser = serde_json::from_str(raw).unwrap();
        let user = stored.normalize();
        assert_eq!(user.role, Role::Admin);

        let raw = r#"{"username":"carol","password":"pw","role":null}"#;
        let stored: StoredUser = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.normalize().role, Role::User);
    }

    #[test]
    fn default_users_contain_one_admin() {
        let users = default_users();
        assert_eq!(admin_count(&users), 1);
        assert_eq!(users[0].username, ADMIN_USERNAME);
    }

    #[test]
    fn user_round_trips_through_json() {
        let user = User::new("alice", "secret", Role::User);
        let raw = serde_json::to_string(&user).unwrap();
        assert!(raw.contains(r#""role":"user""#));
        let back: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, user);
    }
}
