//! Credo - a news classification and moderation service

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credo::{
    api::{self, AppState},
    classifier::{self, TrainOptions},
    config::Config,
    dataset,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxEndorsementRepository, SqlxReportRepository,
            SqlxUserRepository,
        },
    },
    services::{
        article::ArticleService, moderation::ModerationService, user::UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credo=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Credo news classification service...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Load the labeled dataset. An unusable dataset (missing, too small,
    // or single-class) is a deployment misconfiguration and aborts
    // startup here rather than serving an untrained model.
    let records = dataset::load_dataset(&config.dataset.path)
        .with_context(|| format!("Cannot load dataset {}", config.dataset.path.display()))?;
    tracing::info!("Loaded {} labeled record(s)", records.len());

    let options = TrainOptions {
        alpha: config.model.alpha,
        seed: config.model.split_seed,
    };
    let model = classifier::train(&records, &options).context("Model training failed")?;
    tracing::info!(
        "Model trained: held-out accuracy {:.3} (alpha {}, seed {})",
        model.accuracy(),
        options.alpha,
        options.seed
    );

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let endorsement_repo = SqlxEndorsementRepository::boxed(pool.clone());
    let report_repo = SqlxReportRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo));
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        endorsement_repo,
        Arc::new(model.clone()),
    ));
    let moderation_service = Arc::new(ModerationService::new(report_repo, article_repo));

    // The guest account must exist before anything is served
    let guest = user_service.ensure_guest().await?;

    // Seed an empty store with the ground-truth articles
    let imported = article_service.import_dataset(&records, &guest).await?;
    if imported > 0 {
        tracing::info!("Seeded article store with {} article(s)", imported);
    }

    // Build application state
    let state = AppState {
        user_service,
        article_service,
        moderation_service,
        guest,
        model_accuracy: model.accuracy(),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
