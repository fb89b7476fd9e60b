//! Article repository
//!
//! Database operations for classified articles: insertion, the three
//! listing orders (recent, popular, random sample), and deletion.
//!
//! Ordering contracts:
//! - recent: id descending (insertion order proxy)
//! - popular: endorsement count descending, ties broken by ascending id
//!   so paging is stable
//! - random: SQL RANDOM() sample, no order guaranteed

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{Article, Label, RankedArticle};

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a classified article, returning its id
    async fn insert(
        &self,
        title: &str,
        content: &str,
        label: Label,
        confidence: f64,
    ) -> Result<i64>;

    /// Get an article by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Most recent articles, id descending
    async fn fetch_recent(&self, limit: i64) -> Result<Vec<Article>>;

    /// Most endorsed articles with their endorsement counts
    async fn fetch_popular(&self, limit: i64) -> Result<Vec<RankedArticle>>;

    /// A random sample of articles
    async fn fetch_random(&self, limit: i64) -> Result<Vec<Article>>;

    /// Delete an article and everything referencing it.
    ///
    /// Returns false if the article did not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count stored articles
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        label: Label,
        confidence: f64,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, content, label, confidence)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(label.as_str())
        .bind(confidence)
        .execute(&self.pool)
        .await
        .context("Failed to insert article")?;

        Ok(result.last_insert_rowid())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, label, confidence
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by id")?;

        match row {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_recent(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, label, confidence
            FROM articles
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch recent articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn fetch_popular(&self, limit: i64) -> Result<Vec<RankedArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.title, a.content, a.label, a.confidence,
                   COUNT(e.user_id) AS endorsement_count
            FROM articles a
            LEFT JOIN endorsements e ON a.id = e.article_id
            GROUP BY a.id
            ORDER BY endorsement_count DESC, a.id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch popular articles")?;

        rows.iter()
            .map(|row| {
                Ok(RankedArticle {
                    article: row_to_article(row)?,
                    endorsement_count: row.get("endorsement_count"),
                })
            })
            .collect()
    }

    async fn fetch_random(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, label, confidence
            FROM articles
            ORDER BY RANDOM()
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch random articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Explicit cascade: dependents first, then the article itself
        sqlx::query("DELETE FROM reports WHERE article_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete article reports")?;

        sqlx::query("DELETE FROM endorsements WHERE article_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete article endorsements")?;

        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete article")?;

        tx.commit().await.context("Failed to commit delete")?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM articles")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count articles")?;

        Ok(row.get("count"))
    }
}

pub(crate) fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let label_str: String = row.get("label");
    let label = Label::from_str(&label_str)
        .with_context(|| format!("Invalid label in database: {}", label_str))?;

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        label,
        confidence: row.get("confidence"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{EndorsementRepository, SqlxEndorsementRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, SqlxArticleRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxArticleRepository::new(pool.clone());
        (pool, repo)
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
    async fn test_insert_and_fetch_round_trip() {
        let (_pool, repo) = setup().await;

        let id = repo
            .insert("Moon base opens", "First permanent crew arrived", Label::Real, 0.92)
            .await
            .expect("Failed to insert");
        assert!(id > 0);

        let articles = repo.fetch_recent(1).await.expect("Failed to fetch");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, id);
        assert_eq!(articles[0].title, "Moon base opens");
        assert_eq!(articles[0].content, "First permanent crew arrived");
        assert_eq!(articles[0].label, Label::Real);
        assert!((articles[0].confidence - 0.92).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fetch_recent_orders_by_id_desc() {
        let (_pool, repo) = setup().await;

        let first = repo.insert("a", "x", Label::Fake, 0.0).await.unwrap();
        let second = repo.insert("b", "y", Label::Real, 0.0).await.unwrap();
        let third = repo.insert("c", "z", Label::Fake, 0.0).await.unwrap();

        let articles = repo.fetch_recent(10).await.unwrap();
        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_fetch_popular_ordering_with_tie_break() {
        let (pool, repo) = setup().await;
        let endorsements = SqlxEndorsementRepository::new(pool.clone());

        // B gets a lower id than A; both end at 3 endorsements, C at 1.
        let b = repo.insert("B", "b", Label::Real, 0.0).await.unwrap();
        let a = repo.insert("A", "a", Label::Real, 0.0).await.unwrap();
        let c = repo.insert("C", "c", Label::Fake, 0.0).await.unwrap();

        let mut users = Vec::new();
        for name in ["u1", "u2", "u3"] {
            users.push(insert_user(&pool, name).await);
        }

        for user in &users {
            endorsements.add(*user, a).await.unwrap();
            endorsements.add(*user, b).await.unwrap();
        }
        endorsements.add(users[0], c).await.unwrap();

        let popular = repo.fetch_popular(3).await.unwrap();
        let ids: Vec<i64> = popular.iter().map(|r| r.article.id).collect();
        assert_eq!(ids, vec![b, a, c]);
        assert_eq!(popular[0].endorsement_count, 3);
        assert_eq!(popular[1].endorsement_count, 3);
        assert_eq!(popular[2].endorsement_count, 1);
    }

    #[tokio::test]
    async fn test_fetch_random_sample_size() {
        let (_pool, repo) = setup().await;

        for i in 0..5 {
            repo.insert(&format!("t{}", i), "c", Label::Real, 0.0)
                .await
                .unwrap();
        }

        let sample = repo.fetch_random(3).await.unwrap();
        assert_eq!(sample.len(), 3);

        let all = repo.fetch_random(50).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_cascades_reports_and_endorsements() {
        let (pool, repo) = setup().await;
        let endorsements = SqlxEndorsementRepository::new(pool.clone());

        let article = repo.insert("t", "c", Label::Fake, 0.5).await.unwrap();
        let user = insert_user(&pool, "reporter").await;
        endorsements.add(user, article).await.unwrap();
        sqlx::query("INSERT INTO reports (user_id, article_id, report_content) VALUES (?, ?, ?)")
            .bind(user)
            .bind(article)
            .bind("this classification is plainly wrong")
            .execute(&pool)
            .await
            .unwrap();

        let deleted = repo.delete(article).await.unwrap();
        assert!(deleted);

        assert!(repo.get_by_id(article).await.unwrap().is_none());
        let reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(reports, 0);
        assert_eq!(endorsements.count_for_article(article).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_article_returns_false() {
        let (_pool, repo) = setup().await;
        let deleted = repo.delete(999).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_count() {
        let (_pool, repo) = setup().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.insert("t", "c", Label::Real, 0.0).await.unwrap();
        repo.insert("t2", "c2", Label::Fake, 0.0).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
