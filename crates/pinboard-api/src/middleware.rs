use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use pinboard_types::models::User;

use crate::auth::AppState;
use crate::error::ApiError;

/// The requester resolved by `require_auth`, available to protected
/// handlers as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract and validate the bearer token, then resolve its subject to a
/// live user record. Runs on every protected call; nothing is cached
/// between requests.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthenticated)?;

    // A token must not outlive its subject's record.
    let user = state
        .db
        .get_user_by_email(&claims.sub)?
        .ok_or(ApiError::Unauthenticated)?;

    if !user.is_active {
        return Err(ApiError::Unauthenticated);
    }

    req.extensions_mut().insert(CurrentUser(User {
        id: user.id,
        email: user.email,
        is_active: user.is_active,
    }));
    Ok(next.run(req).await)
}
