use std::path::PathBuf;
use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use pinboard_auth::password::{hash_password, verify_password};
use pinboard_auth::token::TokenSigner;
use pinboard_db::Database;
use pinboard_types::api::{LoginRequest, RegisterRequest, TokenResponse};
use pinboard_types::models::User;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenSigner,
    pub upload_dir: PathBuf,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if !req.email.contains('@') || req.email.len() > 254 {
        return Err(ApiError::BadRequest("invalid email address"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest("password must be at least 8 characters"));
    }

    let hashed = hash_password(&req.password)?;

    // The insert itself enforces email uniqueness.
    let row = state
        .db
        .create_user(&req.email, &hashed)?
        .ok_or(ApiError::Conflict)?;

    info!("registered user {}", row.id);
    Ok((
        StatusCode::CREATED,
        Json(User {
            id: row.id,
            email: row.email,
            is_active: row.is_active,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.username)?
        .ok_or(ApiError::Unauthenticated)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(ApiError::Unauthenticated);
    }

    // Deactivated accounts get the same generic rejection as bad credentials.
    if !user.is_active {
        return Err(ApiError::Unauthenticated);
    }

    let token = state.tokens.issue(&user.email)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Stub: the endpoint exists for client compatibility, nothing more.
pub async fn google_auth() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Google sign-in is not available on this server."
    }))
}
