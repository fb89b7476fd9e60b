//! Article service
//!
//! Classification-and-persist flow plus the article listings. Every
//! successful submission or view links the acting user (guest included)
//! to the article, which is what popularity ranking counts.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::classifier::TrainedModel;
use crate::dataset::NewsRecord;
use crate::db::repositories::{ArticleRepository, EndorsementRepository};
use crate::models::{Article, RankedArticle, User};

/// Confidence sentinel for articles whose label was assigned without a
/// model score (bulk-loaded ground truth).
pub const UNSCORED_CONFIDENCE: f64 = 0.0;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Article not found
    #[error("Article {0} not found")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service: classification, persistence, and listings
pub struct ArticleService {
    article_repo: Arc<dyn ArticleRepository>,
    endorsement_repo: Arc<dyn EndorsementRepository>,
    model: Arc<TrainedModel>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(
        article_repo: Arc<dyn ArticleRepository>,
        endorsement_repo: Arc<dyn EndorsementRepository>,
        model: Arc<TrainedModel>,
    ) -> Self {
        Self {
            article_repo,
            endorsement_repo,
            model,
        }
    }

    /// Classify a submission and persist it, linked to the acting user.
    ///
    /// Both headline and content are required; an empty field is a
    /// validation failure, not a classification of nothing.
    pub async fn classify_and_store(
        &self,
        user: &User,
        title: &str,
        content: &str,
    ) -> Result<Article, ArticleServiceError> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Both a headline and content are required".to_string(),
            ));
        }

        let classification = self.model.classify(title, content);

        let id = self
            .article_repo
            .insert(title, content, classification.label, classification.confidence)
            .await
            .context("Failed to store article")?;

        self.endorsement_repo
            .add(user.id, id)
            .await
            .context("Failed to link user to article")?;

        tracing::debug!(
            "Stored article {} as {} (confidence {:.3}) for user '{}'",
            id,
            classification.label,
            classification.confidence,
            user.username
        );

        Ok(Article {
            id,
            title: title.to_string(),
            content: content.to_string(),
            label: classification.label,
            confidence: classification.confidence,
        })
    }

    /// Fetch an article and link the viewing user to it.
    pub async fn view_article(
        &self,
        user: &User,
        article_id: i64,
    ) -> Result<Article, ArticleServiceError> {
        let article = self
            .article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to fetch article")?
            .ok_or(ArticleServiceError::NotFound(article_id))?;

        self.endorsement_repo
            .add(user.id, article_id)
            .await
            .context("Failed to link user to article")?;

        Ok(article)
    }

    /// Most endorsed articles, ties broken by ascending id
    pub async fn popular(&self, limit: i64) -> Result<Vec<RankedArticle>> {
        self.article_repo.fetch_popular(limit).await
    }

    /// Most recently inserted articles
    pub async fn recent(&self, limit: i64) -> Result<Vec<Article>> {
        self.article_repo.fetch_recent(limit).await
    }

    /// Random article sample
    pub async fn random(&self, limit: i64) -> Result<Vec<Article>> {
        self.article_repo.fetch_random(limit).await
    }

    /// Seed the store from the labeled dataset.
    ///
    /// Only runs against an empty store, so user-submitted articles are
    /// never clobbered on restart. Every seeded article carries the
    /// unscored-confidence sentinel and an endorsement from the guest
    /// account.
    pub async fn import_dataset(&self, records: &[NewsRecord], guest: &User) -> Result<usize> {
        if self.article_repo.count().await? > 0 {
            tracing::debug!("Article store already populated, skipping dataset import");
            return Ok(0);
        }

        for record in records {
            let id = self
                .article_repo
                .insert(
                    &record.title,
                    &record.content,
                    record.label,
                    UNSCORED_CONFIDENCE,
                )
                .await
                .context("Failed to seed article")?;
            self.endorsement_repo
                .add(guest.id, id)
                .await
                .context("Failed to endorse seeded article")?;
        }

        tracing::info!("Imported {} dataset article(s)", records.len());

        Ok(records.len())
    }
}
