//! Auth API endpoints
//!
//! Registration and credential verification. Successful login returns
//! the user's identity and role; callers resend credentials with later
//! requests instead of holding a session token.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::api::{authenticate, internal_error, AppState, Credentials};
use crate::models::UserRole;
use crate::services::UserServiceError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Defaults to a normal user
    #[serde(default)]
    pub role: UserRole,
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    match state
        .user_service
        .register(&req.username, &req.password, req.role)
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "user": user })),
        )
            .into_response(),
        Err(UserServiceError::ValidationError(message)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Err(UserServiceError::UserExists(message)) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Err(UserServiceError::InternalError(e)) => internal_error(e),
    }
}

/// Verify credentials and return the matching identity
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> impl IntoResponse {
    match authenticate(&state, &credentials).await {
        Ok(user) => Json(serde_json::json!({ "user": user })).into_response(),
        Err(response) => response,
    }
}
