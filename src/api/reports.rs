//! Report API endpoints
//!
//! Report submission for authenticated users and the admin review /
//! resolution queue. Admin endpoints verify credentials and role on
//! every call.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::api::{authenticate, internal_error, AppState, Credentials};
use crate::models::{Resolution, ResolveAction};
use crate::services::ModerationError;

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub article_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListReportsRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub action: ResolveAction,
    pub user_id: i64,
    pub article_id: i64,
}

fn moderation_error_response(error: ModerationError) -> Response {
    let status = match &error {
        ModerationError::GuestCannotReport
        | ModerationError::AdminCannotReport
        | ModerationError::NotAuthorized => StatusCode::FORBIDDEN,
        ModerationError::ReportTooShort(_) => StatusCode::BAD_REQUEST,
        ModerationError::DuplicateReport => StatusCode::CONFLICT,
        ModerationError::ArticleNotFound(_) => StatusCode::NOT_FOUND,
        ModerationError::InternalError(e) => return internal_error(e),
    };

    (status, Json(serde_json::json!({ "error": error.to_string() }))).into_response()
}

/// Submit a report disputing a classification
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitReportRequest>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &req.credentials).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .moderation_service
        .submit_report(&user, req.article_id, &req.text)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "status": "reported" })),
        )
            .into_response(),
        Err(e) => moderation_error_response(e),
    }
}

/// List all open reports (admin only)
pub async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListReportsRequest>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &req.credentials).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.moderation_service.list_reports(&user).await {
        Ok(reports) => Json(serde_json::json!({ "reports": reports })).into_response(),
        Err(e) => moderation_error_response(e),
    }
}

/// Resolve a report (admin only)
pub async fn resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    let user = match authenticate(&state, &req.credentials).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .moderation_service
        .resolve(&user, req.action, req.user_id, req.article_id)
        .await
    {
        Ok(Resolution::AlreadyResolved) => Json(serde_json::json!({
            "resolution": Resolution::AlreadyResolved,
            "notice": "already handled",
        }))
        .into_response(),
        Ok(resolution) => Json(serde_json::json!({ "resolution": resolution })).into_response(),
        Err(e) => moderation_error_response(e),
    }
}
