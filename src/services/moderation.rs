//! Moderation service
//!
//! The report lifecycle. A report is OPEN from submission until an admin
//! resolves it; every resolution (toggle the label, delete the article,
//! or dismiss) is terminal and removes the report record, so there is no
//! resolved state to transition out of.
//!
//! Submission preconditions: the reporter is neither an admin nor the
//! guest account, the justification is at least 20 characters, the
//! article exists, and the user holds no prior report on it.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, ReportInsert, ReportRepository};
use crate::models::{ReportView, Resolution, ResolveAction, User};

/// Minimum length of a report justification, in characters.
pub const MIN_REPORT_LEN: usize = 20;

/// Error types for moderation operations
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// The guest account cannot dispute classifications
    #[error("Guest users cannot submit reports")]
    GuestCannotReport,

    /// Admins adjudicate reports; they do not file them
    #[error("Admin users cannot submit reports")]
    AdminCannotReport,

    /// Justification too short
    #[error("Report text must be at least {MIN_REPORT_LEN} characters, got {0}")]
    ReportTooShort(usize),

    /// The user already reported this article
    #[error("A report for this article already exists")]
    DuplicateReport,

    /// The disputed article does not exist
    #[error("Article {0} not found")]
    ArticleNotFound(i64),

    /// The caller lacks the admin role
    #[error("This action requires the admin role")]
    NotAuthorized,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Moderation service: report submission and resolution
pub struct ModerationService {
    report_repo: Arc<dyn ReportRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl ModerationService {
    /// Create a new moderation service
    pub fn new(
        report_repo: Arc<dyn ReportRepository>,
        article_repo: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self {
            report_repo,
            article_repo,
        }
    }

    /// Submit a report disputing an article's classification.
    ///
    /// Precondition violations are typed failures with no state change.
    pub async fn submit_report(
        &self,
        user: &User,
        article_id: i64,
        text: &str,
    ) -> Result<(), ModerationError> {
        if user.is_guest() {
            return Err(ModerationError::GuestCannotReport);
        }
        if user.is_admin() {
            return Err(ModerationError::AdminCannotReport);
        }

        let text = text.trim();
        let length = text.chars().count();
        if length < MIN_REPORT_LEN {
            return Err(ModerationError::ReportTooShort(length));
        }

        if self
            .article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to check article")?
            .is_none()
        {
            return Err(ModerationError::ArticleNotFound(article_id));
        }

        match self
            .report_repo
            .create(user.id, article_id, text)
            .await
            .context("Failed to store report")?
        {
            ReportInsert::Created => {
                tracing::info!(
                    "User '{}' reported article {}",
                    user.username,
                    article_id
                );
                Ok(())
            }
            ReportInsert::Duplicate => Err(ModerationError::DuplicateReport),
        }
    }

    /// All open reports, for the admin review queue.
    pub async fn list_reports(&self, admin: &User) -> Result<Vec<ReportView>, ModerationError> {
        if !admin.is_admin() {
            return Err(ModerationError::NotAuthorized);
        }

        Ok(self
            .report_repo
            .fetch_all()
            .await
            .context("Failed to fetch reports")?)
    }

    /// Resolve the report identified by `(user_id, article_id)`.
    ///
    /// A report that vanished under us (resolved concurrently by another
    /// admin) yields `Resolution::AlreadyResolved`, a notice rather than
    /// an error.
    pub async fn resolve(
        &self,
        admin: &User,
        action: ResolveAction,
        user_id: i64,
        article_id: i64,
    ) -> Result<Resolution, ModerationError> {
        if !admin.is_admin() {
            return Err(ModerationError::NotAuthorized);
        }

        let resolution = self
            .report_repo
            .resolve(action, user_id, article_id)
            .await
            .context("Failed to resolve report")?;

        match &resolution {
            Resolution::Toggled(label) => {
                tracing::info!(
                    "Admin '{}' toggled article {} to {}",
                    admin.username,
                    article_id,
                    label
                );
            }
            Resolution::ArticleDeleted => {
                tracing::info!(
                    "Admin '{}' deleted article {} with all its reports",
                    admin.username,
                    article_id
                );
            }
            Resolution::Dismissed => {
                tracing::info!(
                    "Admin '{}' dismissed the report on article {}",
                    admin.username,
                    article_id
                );
            }
            Resolution::AlreadyResolved => {
                tracing::info!(
                    "Report on article {} was already handled",
                    article_id
                );
            }
        }

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxArticleRepository, SqlxReportRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Label, UserRole, GUEST_USERNAME};
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        service: ModerationService,
        articles: Arc<SqlxArticleRepository>,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let articles = Arc::new(SqlxArticleRepository::new(pool.clone()));
        let service = ModerationService::new(
            SqlxReportRepository::boxed(pool.clone()),
            articles.clone(),
        );
        Fixture {
            pool,
            service,
            articles,
        }
    }

    async fn make_user(fx: &Fixture, name: &str, role: UserRole) -> User {
        let id = sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, 'h', ?)")
            .bind(name)
            .bind(role.to_string())
            .execute(&fx.pool)
            .await
            .expect("Failed to insert user")
            .last_insert_rowid();
        let mut user = User::new(name.to_string(), "h".to_string(), role);
        user.id = id;
        user
    }

    const VALID_REPORT: &str = "this label looks wrong to me, please recheck";

    #[tokio::test]
    async fn test_submit_report_length_boundary() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Real, 0.7)
            .await
            .unwrap();

        // 10 characters: rejected
        let short = fx.service.submit_report(&alice, article, "too short!").await;
        assert!(matches!(short, Err(ModerationError::ReportTooShort(10))));

        // 25 characters: accepted and listed
        let ok = fx
            .service
            .submit_report(&alice, article, "twenty five characters ok")
            .await;
        assert!(ok.is_ok());

        let admin = make_user(&fx, "root", UserRole::Admin).await;
        let reports = fx.service.list_reports(&admin).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_content, "twenty five characters ok");
    }

    #[tokio::test]
    async fn test_guest_and_admin_cannot_report() {
        let fx = setup().await;
        let guest = make_user(&fx, GUEST_USERNAME, UserRole::Normal).await;
        let admin = make_user(&fx, "root", UserRole::Admin).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Fake, 0.9)
            .await
            .unwrap();

        assert!(matches!(
            fx.service.submit_report(&guest, article, VALID_REPORT).await,
            Err(ModerationError::GuestCannotReport)
        ));
        assert!(matches!(
            fx.service.submit_report(&admin, article, VALID_REPORT).await,
            Err(ModerationError::AdminCannotReport)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_report_rejected() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Fake, 0.9)
            .await
            .unwrap();

        fx.service
            .submit_report(&alice, article, VALID_REPORT)
            .await
            .unwrap();
        let second = fx.service.submit_report(&alice, article, VALID_REPORT).await;
        assert!(matches!(second, Err(ModerationError::DuplicateReport)));
    }

    #[tokio::test]
    async fn test_report_on_missing_article_rejected() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;

        let result = fx.service.submit_report(&alice, 999, VALID_REPORT).await;
        assert!(matches!(result, Err(ModerationError::ArticleNotFound(999))));
    }

    #[tokio::test]
    async fn test_resolution_requires_admin_role() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;

        assert!(matches!(
            fx.service.list_reports(&alice).await,
            Err(ModerationError::NotAuthorized)
        ));
        assert!(matches!(
            fx.service
                .resolve(&alice, ResolveAction::Dismiss, alice.id, 1)
                .await,
            Err(ModerationError::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_resolve_toggle_round_trip() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let admin = make_user(&fx, "root", UserRole::Admin).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Fake, 0.8)
            .await
            .unwrap();

        fx.service
            .submit_report(&alice, article, VALID_REPORT)
            .await
            .unwrap();

        let resolution = fx
            .service
            .resolve(&admin, ResolveAction::Toggle, alice.id, article)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::Toggled(Label::Real));

        // Report is gone; resolving again is a notice, not an error
        let again = fx
            .service
            .resolve(&admin, ResolveAction::Toggle, alice.id, article)
            .await
            .unwrap();
        assert_eq!(again, Resolution::AlreadyResolved);

        // The label stayed flipped exactly once
        let stored = fx.articles.get_by_id(article).await.unwrap().unwrap();
        assert_eq!(stored.label, Label::Real);
    }

    #[tokio::test]
    async fn test_resolve_delete_clears_everything() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let bob = make_user(&fx, "bob", UserRole::Normal).await;
        let admin = make_user(&fx, "root", UserRole::Admin).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Real, 0.6)
            .await
            .unwrap();

        fx.service
            .submit_report(&alice, article, VALID_REPORT)
            .await
            .unwrap();
        fx.service
            .submit_report(&bob, article, "bob thinks this is mislabeled too")
            .await
            .unwrap();

        let resolution = fx
            .service
            .resolve(&admin, ResolveAction::Delete, alice.id, article)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::ArticleDeleted);

        assert!(fx.articles.get_by_id(article).await.unwrap().is_none());
        assert!(fx.service.list_reports(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_dismiss_keeps_article() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let admin = make_user(&fx, "root", UserRole::Admin).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Fake, 0.55)
            .await
            .unwrap();

        fx.service
            .submit_report(&alice, article, VALID_REPORT)
            .await
            .unwrap();

        let resolution = fx
            .service
            .resolve(&admin, ResolveAction::Dismiss, alice.id, article)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::Dismissed);

        let stored = fx.articles.get_by_id(article).await.unwrap().unwrap();
        assert_eq!(stored.label, Label::Fake);
        assert!(fx.service.list_reports(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_whitespace_is_trimmed_before_length_check() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice", UserRole::Normal).await;
        let article = fx
            .articles
            .insert("t", "c", Label::Real, 0.7)
            .await
            .unwrap();

        let padded = format!("   {}   ", "short but padded");
        let result = fx.service.submit_report(&alice, article, &padded).await;
        assert!(matches!(result, Err(ModerationError::ReportTooShort(16))));
    }
}
