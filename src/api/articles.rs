//! Article API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::{internal_error, resolve_user, AppState, Credentials};
use crate::services::ArticleServiceError;

fn default_limit() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub title: String,
    pub content: String,
    /// Absent credentials submit as the guest account
    #[serde(flatten)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    #[serde(flatten)]
    pub credentials: Option<Credentials>,
}

/// Classify a submission and persist it
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> impl IntoResponse {
    let user = match resolve_user(&state, req.credentials.as_ref()).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .article_service
        .classify_and_store(&user, &req.title, &req.content)
        .await
    {
        Ok(article) => Json(serde_json::json!({ "article": article })).into_response(),
        Err(ArticleServiceError::ValidationError(message)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Err(ArticleServiceError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Article {} not found", id) })),
        )
            .into_response(),
        Err(ArticleServiceError::InternalError(e)) => internal_error(e),
    }
}

/// Fetch one article, linking the viewer to it
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ViewRequest>,
) -> impl IntoResponse {
    let user = match resolve_user(&state, req.credentials.as_ref()).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.article_service.view_article(&user, id).await {
        Ok(article) => Json(serde_json::json!({ "article": article })).into_response(),
        Err(ArticleServiceError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Article {} not found", id) })),
        )
            .into_response(),
        Err(ArticleServiceError::ValidationError(message)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Err(ArticleServiceError::InternalError(e)) => internal_error(e),
    }
}

/// Most endorsed articles
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.article_service.popular(query.limit).await {
        Ok(articles) => Json(serde_json::json!({ "articles": articles })).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Most recent articles
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.article_service.recent(query.limit).await {
        Ok(articles) => Json(serde_json::json!({ "articles": articles })).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Random article sample
pub async fn random(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.article_service.random(query.limit).await {
        Ok(articles) => Json(serde_json::json!({ "articles": articles })).into_response(),
        Err(e) => internal_error(e),
    }
}
