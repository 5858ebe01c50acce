use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tokio::io::AsyncWriteExt;
use tracing::error;
use uuid::Uuid;

use pinboard_types::api::UploadResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Upload cap; the router's body limit is raised to match.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// POST /upload: accepts raw bytes (application/octet-stream), saves the
/// blob under a fresh UUID name, returns the URL to reference from a
/// message. Collision-free naming is the whole of this module's contract;
/// message records treat the returned URL as an opaque string.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("empty upload"));
    }

    if bytes.len() > MAX_FILE_SIZE {
        return Err(ApiError::PayloadTooLarge);
    }

    let name = Uuid::new_v4().to_string();

    tokio::fs::create_dir_all(&state.upload_dir).await.map_err(|e| {
        error!("failed to create upload directory: {}", e);
        ApiError::Internal(e.into())
    })?;

    let path = state.upload_dir.join(&name);
    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        error!("failed to create {}: {}", path.display(), e);
        ApiError::Internal(e.into())
    })?;
    file.write_all(&bytes).await.map_err(|e| {
        error!("failed to write {}: {}", path.display(), e);
        ApiError::Internal(e.into())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_url: format!("/uploads/{}", name),
        }),
    ))
}
