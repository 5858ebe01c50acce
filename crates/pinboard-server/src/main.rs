use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use pinboard_api::auth::{AppState, AppStateInner};
use pinboard_auth::token::TokenSigner;
use pinboard_server::{app, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pinboard_server=debug,pinboard_api=debug,pinboard_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = pinboard_db::Database::open(Path::new(&config.db_path))?;

    let tokens = TokenSigner::new(
        &config.jwt_secret,
        Duration::minutes(config.token_ttl_minutes),
    );
    let upload_dir = PathBuf::from(&config.upload_dir);

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens,
        upload_dir: upload_dir.clone(),
    });

    let app = app::build_router(state, &upload_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Pinboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
