//! API layer - HTTP handlers and routing
//!
//! JSON endpoints over the services: classification and article
//! listings, registration/login, report submission, and the admin
//! review queue. Identity travels with each request as credentials in
//! the body or query; there is no session store at this layer.

pub mod articles;
pub mod auth;
pub mod reports;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::User;
use crate::services::{ArticleService, ModerationService, UserService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub article_service: Arc<ArticleService>,
    pub moderation_service: Arc<ModerationService>,
    /// The well-known guest identity, resolved at startup
    pub guest: User,
    /// Held-out accuracy of the model currently serving predictions
    pub model_accuracy: f64,
}

/// Credentials carried in a request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolve optional credentials to a user, falling back to the guest
/// account when none are supplied. Bad credentials are a 401, not a
/// silent guest downgrade.
pub(crate) async fn resolve_user(
    state: &AppState,
    credentials: Option<&Credentials>,
) -> Result<User, Response> {
    match credentials {
        None => Ok(state.guest.clone()),
        Some(creds) => authenticate(state, creds).await,
    }
}

/// Authenticate required credentials; any failure is a 401 response.
pub(crate) async fn authenticate(
    state: &AppState,
    credentials: &Credentials,
) -> Result<User, Response> {
    match state
        .user_service
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid username or password" })),
        )
            .into_response()),
        Err(e) => Err(internal_error(e)),
    }
}

/// Uniform 500 response; the detail goes to the log, not the client.
pub(crate) fn internal_error<E: std::fmt::Display>(error: E) -> Response {
    tracing::error!("Internal error: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

/// Health and model status
async fn health(state: axum::extract::State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_accuracy": state.model_accuracy,
    }))
}

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(articles::classify))
        .route("/articles/popular", get(articles::popular))
        .route("/articles/recent", get(articles::recent))
        .route("/articles/random", get(articles::random))
        .route("/articles/{id}", post(articles::view))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/reports", post(reports::submit))
        .route("/admin/reports", post(reports::list))
        .route("/admin/reports/resolve", post(reports::resolve))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
