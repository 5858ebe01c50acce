use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, warn};

use pinboard_db::OwnedMutation;
use pinboard_db::models::MessageRow;
use pinboard_types::api::{CreateMessageRequest, UpdateMessageRequest};
use pinboard_types::models::Message;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Hard cap on a single page; callers asking for more get this many.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
}

fn default_limit() -> u32 {
    10
}

/// GET /messages: public read over all users' messages, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let skip = query.skip;
    let limit = query.limit.min(MAX_PAGE_SIZE);
    let search = query.search;

    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_messages(skip, limit, search.as_deref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    let messages: Vec<Message> = rows.into_iter().map(row_to_message).collect();
    Ok(Json(messages))
}

/// POST /messages: owner is always the authenticated caller.
pub async fn create_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.is_empty() {
        return Err(ApiError::BadRequest("content must not be empty"));
    }

    let file_urls = encode_file_urls(req.file_urls.as_deref())?;

    let db = state.clone();
    let owner_id = user.id;
    let content = req.content;
    let file_url = req.file_url;
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .insert_message(&content, file_url.as_deref(), file_urls.as_deref(), owner_id)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    Ok((StatusCode::CREATED, Json(row_to_message(row))))
}

/// PUT /messages/{id}: ownership is checked inside the store transaction;
/// a mismatch renders exactly like a missing id.
pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.is_empty() {
        return Err(ApiError::BadRequest("content must not be empty"));
    }

    let file_urls = encode_file_urls(req.file_urls.as_deref())?;

    let db = state.clone();
    let requester_id = user.id;
    let content = req.content;
    let file_url = req.file_url;
    let outcome = tokio::task::spawn_blocking(move || {
        db.db.update_message(
            message_id,
            requester_id,
            &content,
            file_url.as_deref(),
            file_urls.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    match outcome {
        OwnedMutation::Applied(row) => Ok(Json(row_to_message(row))),
        OwnedMutation::NotOwner => {
            debug!("user {} denied update of message {}: not owner", user.id, message_id);
            Err(ApiError::NotFoundOrUnauthorized)
        }
        OwnedMutation::Missing => {
            debug!("user {} denied update of message {}: no such message", user.id, message_id);
            Err(ApiError::NotFoundOrUnauthorized)
        }
    }
}

/// DELETE /messages/{id}: same ownership precondition as update.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let requester_id = user.id;
    let outcome = tokio::task::spawn_blocking(move || db.db.delete_message(message_id, requester_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    match outcome {
        OwnedMutation::Applied(()) => {
            Ok(Json(serde_json::json!({ "message": "Message deleted successfully" })))
        }
        OwnedMutation::NotOwner => {
            debug!("user {} denied delete of message {}: not owner", user.id, message_id);
            Err(ApiError::NotFoundOrUnauthorized)
        }
        OwnedMutation::Missing => {
            debug!("user {} denied delete of message {}: no such message", user.id, message_id);
            Err(ApiError::NotFoundOrUnauthorized)
        }
    }
}

fn encode_file_urls(file_urls: Option<&[String]>) -> Result<Option<String>, ApiError> {
    match file_urls {
        Some(urls) => {
            let encoded = serde_json::to_string(urls).map_err(|e| ApiError::Internal(e.into()))?;
            Ok(Some(encoded))
        }
        None => Ok(None),
    }
}

fn row_to_message(row: MessageRow) -> Message {
    let file_urls = row
        .file_urls
        .as_deref()
        .map(|raw| {
            serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|e| {
                warn!("corrupt file_urls on message {}: {}", row.id, e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    Message {
        id: row.id,
        content: row.content,
        file_url: row.file_url,
        file_urls,
        timestamp: parse_timestamp(&row.timestamp, row.id),
        owner_id: row.owner_id,
    }
}

fn parse_timestamp(raw: &str, message_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("corrupt timestamp '{}' on message {}: {}", raw, message_id, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_naive_timestamps_parse() {
        let ts = parse_timestamp("2026-08-05 12:30:00", 1);
        assert_eq!(ts.to_rfc3339(), "2026-08-05T12:30:00+00:00");
    }

    #[test]
    fn corrupt_timestamps_fall_back_to_epoch() {
        assert_eq!(parse_timestamp("garbage", 1), DateTime::<Utc>::default());
    }

    #[test]
    fn corrupt_file_urls_become_empty() {
        let row = MessageRow {
            id: 1,
            content: "hi".into(),
            file_url: None,
            file_urls: Some("not json".into()),
            timestamp: "2026-08-05 12:30:00".into(),
            owner_id: 1,
        };
        assert!(row_to_message(row).file_urls.is_empty());
    }
}
