//! User model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Username of the distinguished guest account.
///
/// The guest user always exists after initialization and owns every
/// unauthenticated submission. It cannot be registered or used to report.
pub const GUEST_USERNAME: &str = "guest";

/// A registered user.
///
/// Users are immutable after registration; there is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            role,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if this is the shared guest account
    pub fn is_guest(&self) -> bool {
        self.username == GUEST_USERNAME
    }
}

/// User role for authorization.
///
/// Admins review reports and resolve them; normal users submit articles
/// and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    #[default]
    Normal,
    /// Administrator - reviews and resolves reports
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Normal => write!(f, "normal"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(UserRole::Normal),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_is_admin() {
        let admin = User::new("root".to_string(), "hash".to_string(), UserRole::Admin);
        let normal = User::new("alice".to_string(), "hash".to_string(), UserRole::Normal);

        assert!(admin.is_admin());
        assert!(!normal.is_admin());
    }

    #[test]
    fn test_user_is_guest() {
        let guest = User::new(GUEST_USERNAME.to_string(), "hash".to_string(), UserRole::Normal);
        let alice = User::new("alice".to_string(), "hash".to_string(), UserRole::Normal);

        assert!(guest.is_guest());
        assert!(!alice.is_guest());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("NORMAL").unwrap(), UserRole::Normal);
        assert!(UserRole::from_str("editor").is_err());
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_default_is_normal() {
        assert_eq!(UserRole::default(), UserRole::Normal);
    }
}
