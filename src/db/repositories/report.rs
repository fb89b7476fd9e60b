//! Report repository
//!
//! Database operations for reports, including the resolution actions.
//!
//! Uniqueness of `(user_id, article_id)` is enforced by the primary key,
//! so a duplicate submission loses the race at the storage layer rather
//! than in an application-level check-then-insert. Resolution runs in a
//! single transaction: the report row is removed together with whatever
//! the action does to the article, or nothing happens at all.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{Label, Report, ReportView, Resolution, ResolveAction};

/// Outcome of a report insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportInsert {
    /// The report was stored
    Created,
    /// The user already holds a report on this article
    Duplicate,
}

/// Report repository trait
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a new report. A second report from the same user on the
    /// same article is rejected, not merged.
    async fn create(
        &self,
        user_id: i64,
        article_id: i64,
        report_content: &str,
    ) -> Result<ReportInsert>;

    /// Get a specific report
    async fn get(&self, user_id: i64, article_id: i64) -> Result<Option<Report>>;

    /// All open reports joined with their article titles
    async fn fetch_all(&self) -> Result<Vec<ReportView>>;

    /// Apply a resolution action to the report identified by
    /// `(user_id, article_id)`. The whole action is one transaction.
    async fn resolve(
        &self,
        action: ResolveAction,
        user_id: i64,
        article_id: i64,
    ) -> Result<Resolution>;
}

/// SQLx-based report repository implementation
pub struct SqlxReportRepository {
    pool: SqlitePool,
}

impl SqlxReportRepository {
    /// Create a new SQLx report repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ReportRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ReportRepository for SqlxReportRepository {
    async fn create(
        &self,
        user_id: i64,
        article_id: i64,
        report_content: &str,
    ) -> Result<ReportInsert> {
        let result = sqlx::query(
            r#"
            INSERT INTO reports (user_id, article_id, report_content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .bind(report_content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ReportInsert::Created),
            Err(e) => {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return Ok(ReportInsert::Duplicate);
                    }
                }
                Err(e).context("Failed to create report")
            }
        }
    }

    async fn get(&self, user_id: i64, article_id: i64) -> Result<Option<Report>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, article_id, report_content, created_at
            FROM reports
            WHERE user_id = ? AND article_id = ?
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get report")?;

        Ok(row.map(|r| Report {
            user_id: r.get("user_id"),
            article_id: r.get("article_id"),
            report_content: r.get("report_content"),
            created_at: r.get("created_at"),
        }))
    }

    async fn fetch_all(&self) -> Result<Vec<ReportView>> {
        let rows = sqlx::query(
            r#"
            SELECT r.article_id, a.title, r.report_content, r.user_id
            FROM reports r
            INNER JOIN articles a ON r.article_id = a.id
            ORDER BY r.created_at ASC, r.article_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch reports")?;

        Ok(rows
            .iter()
            .map(|r| ReportView {
                article_id: r.get("article_id"),
                title: r.get("title"),
                report_content: r.get("report_content"),
                user_id: r.get("user_id"),
            })
            .collect())
    }

    async fn resolve(
        &self,
        action: ResolveAction,
        user_id: i64,
        article_id: i64,
    ) -> Result<Resolution> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Resolution always consumes the triggering report; if it is
        // already gone another admin won the race and nothing happens.
        let removed = sqlx::query("DELETE FROM reports WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete report")?;

        if removed.rows_affected() == 0 {
            return Ok(Resolution::AlreadyResolved);
        }

        let resolution = match action {
            ResolveAction::Toggle => {
                let row = sqlx::query("SELECT label FROM articles WHERE id = ?")
                    .bind(article_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .context("Failed to read article label")?;

                let Some(row) = row else {
                    // Article vanished under the report; nothing to flip.
                    return Ok(Resolution::AlreadyResolved);
                };

                let label_str: String = row.get("label");
                let new_label = Label::from_str(&label_str)
                    .with_context(|| format!("Invalid label in database: {}", label_str))?
                    .toggled();

                sqlx::query("UPDATE articles SET label = ? WHERE id = ?")
                    .bind(new_label.as_str())
                    .bind(article_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to toggle article label")?;

                Resolution::Toggled(new_label)
            }
            ResolveAction::Delete => {
                // Takes every report on the article down with it, not
                // just the triggering one.
                sqlx::query("DELETE FROM reports WHERE article_id = ?")
                    .bind(article_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to delete remaining reports")?;

                sqlx::query("DELETE FROM endorsements WHERE article_id = ?")
                    .bind(article_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to delete endorsements")?;

                sqlx::query("DELETE FROM articles WHERE id = ?")
                    .bind(article_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to delete article")?;

                Resolution::ArticleDeleted
            }
            ResolveAction::Dismiss => Resolution::Dismissed,
        };

        tx.commit().await.context("Failed to commit resolution")?;

        Ok(resolution)
    }
}
