use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            email           TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            api_key         TEXT,
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            content     TEXT NOT NULL,
            file_url    TEXT,
            file_urls   TEXT,
            timestamp   TEXT NOT NULL DEFAULT (datetime('now')),
            owner_id    INTEGER NOT NULL REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_messages_timestamp
            ON messages(timestamp DESC, id DESC);

        CREATE INDEX IF NOT EXISTS idx_messages_owner
            ON messages(owner_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
