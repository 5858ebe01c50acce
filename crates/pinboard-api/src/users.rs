use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::info;

use pinboard_auth::apikey::{generate_api_key, validate_api_key};
use pinboard_types::api::{ApiKeyResponse, SetApiKeyRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// GET /users/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    Json(user)
}

/// POST /users/me/api-key: mint a fresh key, replacing any prior one.
pub async fn rotate_api_key(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let key = generate_api_key();
    state.db.set_api_key(user.id, &key)?;

    info!("rotated api key for user {}", user.id);
    Ok(Json(ApiKeyResponse { api_key: key }))
}

/// PUT /users/me/api-key: client-supplied overwrite, gated on the key
/// format check.
pub async fn set_api_key(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<SetApiKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !validate_api_key(&req.api_key) {
        return Err(ApiError::BadRequest(
            "api key must be at least 24 printable ASCII characters",
        ));
    }

    state.db.set_api_key(user.id, &req.api_key)?;

    info!("user {} set a client-supplied api key", user.id);
    Ok(Json(ApiKeyResponse {
        api_key: req.api_key,
    }))
}
