use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Boundary error taxonomy. Credential failures share one message so the
/// API cannot be used to enumerate accounts, and ownership mismatches
/// render exactly like missing rows so existence never leaks.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("email already registered")]
    Conflict,
    #[error("could not validate credentials")]
    Unauthenticated,
    #[error("message not found or unauthorized")]
    NotFoundOrUnauthorized,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("file too large")]
    PayloadTooLarge,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(source) => {
                // Logged server-side, never serialized to the client.
                error!("request failed: {:#}", source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn statuses_match_variants() {
        assert_eq!(
            ApiError::Conflict.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFoundOrUnauthorized.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn bodies_are_json_with_error_field() {
        let body = body_of(ApiError::BadRequest("bad data").into_response()).await;
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn collapsed_denial_never_distinguishes() {
        let body = body_of(ApiError::NotFoundOrUnauthorized.into_response()).await;
        assert_eq!(body, r#"{"error":"message not found or unauthorized"}"#);
    }

    #[tokio::test]
    async fn internal_detail_stays_server_side() {
        let body = body_of(ApiError::Internal(anyhow::anyhow!("secret detail")).into_response()).await;
        assert_eq!(body, r#"{"error":"internal server error"}"#);
    }
}
