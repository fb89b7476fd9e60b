//! User service
//!
//! Registration and authentication. Identity is "verify username and
//! secret, get back a user and role" - there is no session state here;
//! callers pass credentials per request.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::UserRepository;
use crate::models::{User, UserRole, GUEST_USERNAME};
use crate::services::password::{hash_password, verify_password};

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for registration and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Register a new user.
    ///
    /// Fails with a typed validation error on empty fields, on the
    /// reserved guest name, and on a duplicate username.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, UserServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }
        if username == GUEST_USERNAME {
            return Err(UserServiceError::ValidationError(format!(
                "Username '{}' is reserved",
                GUEST_USERNAME
            )));
        }

        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(password).context("Failed to hash password")?;
        let user = User::new(username.to_string(), password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user '{}' with role {}", created.username, created.role);

        Ok(created)
    }

    /// Authenticate by username and secret.
    ///
    /// Returns `None` for an unknown username or a wrong password; the
    /// two cases are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let Some(user) = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to look up user")?
        else {
            return Ok(None);
        };

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;

        Ok(valid.then_some(user))
    }

    /// Look up a user by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.user_repo.get_by_id(id).await
    }

    /// Make sure the well-known guest account exists, creating it on
    /// first startup. Returns the guest user.
    pub async fn ensure_guest(&self) -> Result<User> {
        if let Some(guest) = self
            .user_repo
            .get_by_username(GUEST_USERNAME)
            .await
            .context("Failed to look up guest user")?
        {
            return Ok(guest);
        }

        let password_hash =
            hash_password(GUEST_USERNAME).context("Failed to hash guest password")?;
        let guest = User::new(GUEST_USERNAME.to_string(), password_hash, UserRole::Normal);

        let created = self
            .user_repo
            .create(&guest)
            .await
            .context("Failed to create guest user")?;

        tracing::info!("Created guest account (id {})", created.id);

        Ok(created)
    }
}
