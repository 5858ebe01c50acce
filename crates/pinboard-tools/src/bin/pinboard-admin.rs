//! Operator entrypoint for the privileged channel: credential resets and
//! board stats from the command line, against the same database the server
//! uses.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};

use pinboard_db::Database;
use pinboard_tools::{ServiceAccount, ToolSession};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinboard_tools=info,pinboard_db=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let db_path = std::env::var("PINBOARD_DB_PATH").unwrap_or_else(|_| "pinboard.db".into());
    let db = Arc::new(Database::open(Path::new(&db_path))?);
    let session = ToolSession::new(db, ServiceAccount::new("pinboard-admin"));

    match args.first().map(String::as_str) {
        Some("reset-credentials") => {
            let (Some(email), Some(password)) = (args.get(1), args.get(2)) else {
                bail!("usage: pinboard-admin reset-credentials <email> <password>");
            };
            session.reset_credentials(email, password)?;
            println!("credentials updated for {}", email);
        }
        Some("stats") => {
            let stats = session.stats()?;
            println!("messages: {}", stats.messages);
            println!("users:    {}", stats.users);
        }
        _ => {
            eprintln!("usage: pinboard-admin <reset-credentials <email> <password> | stats>");
            std::process::exit(2);
        }
    }

    Ok(())
}
