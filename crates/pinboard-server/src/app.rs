use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use pinboard_api::auth::{self, AppState};
use pinboard_api::middleware::require_auth;
use pinboard_api::{files, messages, users};

/// Assemble the full router. Registration, login, and the public message
/// listing bypass the gate; everything else runs behind `require_auth`.
pub fn build_router(state: AppState, upload_dir: &Path) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/google", post(auth::google_auth))
        .route("/messages", get(messages::list_messages))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/messages", post(messages::create_message))
        .route(
            "/messages/{message_id}",
            put(messages::update_message).delete(messages::delete_message),
        )
        .route("/users/me", get(users::me))
        .route(
            "/users/me/api-key",
            post(users::rotate_api_key).put(users::set_api_key),
        )
        .route(
            "/upload",
            post(files::upload_file).layer(DefaultBodyLimit::max(files::MAX_FILE_SIZE)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
