use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

/// Outcome of a mutation gated on ownership. Callers render `NotOwner` and
/// `Missing` identically at the boundary; the distinction exists only so
/// denials can be logged with their real reason.
#[derive(Debug)]
pub enum OwnedMutation<T> {
    Applied(T),
    NotOwner,
    Missing,
}

impl Database {
    // -- Users --

    /// Insert a new user. Returns `None` when the email is already
    /// registered: the UNIQUE constraint is the uniqueness check, so there
    /// is no read-then-insert window to race.
    pub fn create_user(&self, email: &str, hashed_password: &str) -> Result<Option<UserRow>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (email, hashed_password) VALUES (?1, ?2)",
                params![email, hashed_password],
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    query_user_by_id(conn, id)
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Overwrite a user's password digest. Returns false when no user with
    /// that email exists.
    pub fn update_password(&self, email: &str, hashed_password: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET hashed_password = ?1 WHERE email = ?2",
                params![hashed_password, email],
            )?;
            Ok(changed > 0)
        })
    }

    /// Assign a user's API key, replacing any prior key. The old key stops
    /// matching literal comparisons the moment this commits.
    pub fn set_api_key(&self, user_id: i64, key: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET api_key = ?1 WHERE id = ?2",
                params![key, user_id],
            )?;
            if changed == 0 {
                return Err(anyhow!("user {} not found", user_id));
            }
            Ok(())
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        content: &str,
        file_url: Option<&str>,
        file_urls: Option<&str>,
        owner_id: i64,
    ) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (content, file_url, file_urls, owner_id) VALUES (?1, ?2, ?3, ?4)",
                params![content, file_url, file_urls, owner_id],
            )?;
            let id = conn.last_insert_rowid();
            query_message(conn, id)?.ok_or_else(|| anyhow!("message {} missing after insert", id))
        })
    }

    /// Newest-first page of messages across all users, optionally filtered
    /// by case-insensitive substring match on content.
    pub fn list_messages(
        &self,
        skip: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, skip, limit, search))
    }

    /// Overwrite content (and file references, when provided) iff the
    /// message exists and belongs to `requester_id`. The owner read and the
    /// write share one transaction.
    pub fn update_message(
        &self,
        id: i64,
        requester_id: i64,
        content: &str,
        file_url: Option<&str>,
        file_urls: Option<&str>,
    ) -> Result<OwnedMutation<MessageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: Option<i64> = tx
                .query_row("SELECT owner_id FROM messages WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let outcome = match owner {
                None => OwnedMutation::Missing,
                Some(owner_id) if owner_id != requester_id => OwnedMutation::NotOwner,
                Some(_) => {
                    tx.execute(
                        "UPDATE messages
                         SET content = ?1,
                             file_url = COALESCE(?2, file_url),
                             file_urls = COALESCE(?3, file_urls)
                         WHERE id = ?4",
                        params![content, file_url, file_urls, id],
                    )?;
                    let row = query_message(&tx, id)?
                        .ok_or_else(|| anyhow!("message {} disappeared mid-transaction", id))?;
                    OwnedMutation::Applied(row)
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    /// Delete iff the message exists and belongs to `requester_id`.
    pub fn delete_message(&self, id: i64, requester_id: i64) -> Result<OwnedMutation<()>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: Option<i64> = tx
                .query_row("SELECT owner_id FROM messages WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let outcome = match owner {
                None => OwnedMutation::Missing,
                Some(owner_id) if owner_id != requester_id => OwnedMutation::NotOwner,
                Some(_) => {
                    tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
                    OwnedMutation::Applied(())
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    /// Privileged-channel update: no ownership check. Returns `None` when
    /// the message does not exist.
    pub fn update_message_unchecked(&self, id: i64, content: &str) -> Result<Option<MessageRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET content = ?1 WHERE id = ?2",
                params![content, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_message(conn, id)
        })
    }

    /// Privileged-channel delete: no ownership check.
    pub fn delete_message_unchecked(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Stats --

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?))
    }

    pub fn count_messages(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, hashed_password, api_key, is_active, created_at
         FROM users WHERE email = ?1",
    )?;

    let row = stmt.query_row([email], map_user_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, hashed_password, api_key, is_active, created_at
         FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_user_row).optional()?;
    Ok(row)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, file_url, file_urls, timestamp, owner_id
         FROM messages WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_message_row).optional()?;
    Ok(row)
}

fn query_messages(
    conn: &Connection,
    skip: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<Vec<MessageRow>> {
    // Timestamps have second resolution; the id tiebreak keeps the order
    // stable for rows created within the same second.
    let rows = match search {
        Some(needle) => {
            let pattern = format!("%{}%", escape_like(needle));
            let mut stmt = conn.prepare(
                "SELECT id, content, file_url, file_urls, timestamp, owner_id
                 FROM messages
                 WHERE content LIKE ?1 ESCAPE '\\'
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;
            stmt.query_map(params![pattern, limit, skip], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, content, file_url, file_urls, timestamp, owner_id
                 FROM messages
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1 OFFSET ?2",
            )?;
            stmt.query_map(params![limit, skip], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok(rows)
}

fn map_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        api_key: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_message_row(row: &rusqlite::Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        content: row.get(1)?,
        file_url: row.get(2)?,
        file_urls: row.get(3)?,
        timestamp: row.get(4)?,
        owner_id: row.get(5)?,
    })
}

/// SQLite LIKE treats `%` and `_` as wildcards; user-supplied search input
/// must match them literally.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
