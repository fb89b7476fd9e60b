//! User repository
//!
//! Database operations for users. Username uniqueness is enforced by the
//! storage constraint; the service layer maps the violation to a typed
//! registration failure.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{User, UserRole};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails on duplicate username.
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Count total users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let role_str = user.role.to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&role_str)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(row.get("count"))
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::services::password::hash_password;

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(username: &str, role: UserRole) -> User {
        User::new(
            username.to_string(),
            hash_password("pw123").expect("Failed to hash password"),
            role,
        )
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup().await;

        let created = repo
            .create(&test_user("alice", UserRole::Normal))
            .await
            .expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "alice");
        assert_eq!(created.role, UserRole::Normal);
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = setup().await;
        repo.create(&test_user("findme", UserRole::Admin))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_username("findme")
            .await
            .expect("Failed to query")
            .expect("User not found");
        assert_eq!(found.role, UserRole::Admin);

        let missing = repo.get_by_username("nobody").await.expect("Failed to query");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let repo = setup().await;
        let created = repo
            .create(&test_user("alice", UserRole::Normal))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to query")
            .expect("User not found");
        assert_eq!(found.username, "alice");

        assert!(repo.get_by_id(999).await.expect("Failed to query").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup().await;
        repo.create(&test_user("dup", UserRole::Normal))
            .await
            .expect("Failed to create first user");

        let result = repo.create(&test_user("dup", UserRole::Normal)).await;
        assert!(result.is_err(), "Should fail due to duplicate username");
    }

    #[tokio::test]
    async fn test_count_users() {
        let repo = setup().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(&test_user("u1", UserRole::Normal)).await.unwrap();
        repo.create(&test_user("u2", UserRole::Admin)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
