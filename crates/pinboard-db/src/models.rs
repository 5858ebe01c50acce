//! Database row types, mapped directly from SQLite rows. Distinct from the
//! pinboard-types API models so the storage layer stays independent of the
//! wire format.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub api_key: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub file_url: Option<String>,
    /// JSON array of additional blob references, stored verbatim.
    pub file_urls: Option<String>,
    pub timestamp: String,
    pub owner_id: i64,
}
