use anyhow::Result;

/// Startup configuration, read from the environment once. The JWT secret
/// and TTL are injected into the token signer from here; nothing reads
/// them ambiently during request handling.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub upload_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("PINBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PINBOARD_PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()?,
            db_path: std::env::var("PINBOARD_DB_PATH").unwrap_or_else(|_| "pinboard.db".into()),
            jwt_secret: std::env::var("PINBOARD_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".into()),
            token_ttl_minutes: std::env::var("PINBOARD_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
            upload_dir: std::env::var("PINBOARD_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
        })
    }
}
