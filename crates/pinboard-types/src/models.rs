use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public view of a user. The password digest and API key never leave the
/// server through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub file_url: Option<String>,
    pub file_urls: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub owner_id: i64,
}
