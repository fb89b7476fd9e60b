//! Endorsement repository
//!
//! Endorsements are the user<->article links behind popularity ranking.
//! Insertion is idempotent (INSERT OR IGNORE on the primary key), which
//! makes concurrent submissions from different sessions commutative
//! without any locking.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Article;

use super::article::row_to_article;

/// Endorsement repository trait
#[async_trait]
pub trait EndorsementRepository: Send + Sync {
    /// Link a user to an article. Re-linking the same pair is a no-op.
    async fn add(&self, user_id: i64, article_id: i64) -> Result<()>;

    /// Number of distinct users endorsing an article
    async fn count_for_article(&self, article_id: i64) -> Result<i64>;

    /// All articles a user has endorsed (their classification history)
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Article>>;
}

/// SQLx-based endorsement repository implementation
pub struct SqlxEndorsementRepository {
    pool: SqlitePool,
}

impl SqlxEndorsementRepository {
    /// Create a new SQLx endorsement repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn EndorsementRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EndorsementRepository for SqlxEndorsementRepository {
    async fn add(&self, user_id: i64, article_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO endorsements (user_id, article_id)
            VALUES (?, ?)
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .context("Failed to add endorsement")?;

        Ok(())
    }

    async fn count_for_article(&self, article_id: i64) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM endorsements WHERE article_id = ?",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count endorsements")?;

        Ok(row.get("count"))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.title, a.content, a.label, a.confidence
            FROM articles a
            INNER JOIN endorsements e ON a.id = e.article_id
            WHERE e.user_id = ?
            ORDER BY a.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list endorsed articles")?;

        rows.iter().map(row_to_article).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ArticleRepository, SqlxArticleRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Label;

    async fn setup() -> (SqlitePool, SqlxEndorsementRepository, SqlxArticleRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        (
            pool.clone(),
            SqlxEndorsementRepository::new(pool.clone()),
            SqlxArticleRepository::new(pool),
        )
    }

    async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, 'h', 'normal')")
            .bind(username)
            .execute(pool)
            .await
            .expect("Failed to insert user")
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (pool, endorsements, articles) = setup().await;

        let user = insert_user(&pool, "alice").await;
        let article = articles.insert("t", "c", Label::Real, 0.0).await.unwrap();

        endorsements.add(user, article).await.unwrap();
        endorsements.add(user, article).await.unwrap();

        assert_eq!(endorsements.count_for_article(article).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_distinct_users_counted_separately() {
        let (pool, endorsements, articles) = setup().await;

        let article = articles.insert("t", "c", Label::Fake, 0.0).await.unwrap();
        for name in ["u1", "u2"] {
            let user = insert_user(&pool, name).await;
            endorsements.add(user, article).await.unwrap();
        }

        assert_eq!(endorsements.count_for_article(article).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let (pool, endorsements, articles) = setup().await;

        let user = insert_user(&pool, "alice").await;
        let a1 = articles.insert("t1", "c1", Label::Real, 0.0).await.unwrap();
        let a2 = articles.insert("t2", "c2", Label::Fake, 0.0).await.unwrap();
        articles.insert("t3", "c3", Label::Real, 0.0).await.unwrap();

        endorsements.add(user, a1).await.unwrap();
        endorsements.add(user, a2).await.unwrap();

        let history = endorsements.list_for_user(user).await.unwrap();
        let ids: Vec<i64> = history.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a2, a1]);
    }
}
