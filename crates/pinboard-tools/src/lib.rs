//! Privileged automation channel. Out-of-band tooling (bots, ops scripts)
//! reads and writes the board through a [`ToolSession`] bound to a named
//! service account. Unlike the HTTP surface, mutations here skip the
//! ownership gate: this channel is trusted by construction, and every
//! call is logged with the account that made it.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::info;

use pinboard_auth::password::hash_password;
use pinboard_db::Database;
use pinboard_db::models::MessageRow;

/// Identity attached to every privileged call; shows up in the logs, never
/// in the data.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub name: String,
}

impl ServiceAccount {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub struct ToolSession {
    db: Arc<Database>,
    account: ServiceAccount,
}

/// Result of an on-behalf-of post. `key_verified` is informational only:
/// `None` when the user has no stored key, otherwise whether the supplied
/// key matched. A mismatch never blocks the post.
#[derive(Debug)]
pub struct PostReceipt {
    pub message: MessageRow,
    pub key_verified: Option<bool>,
}

#[derive(Debug)]
pub struct BoardStats {
    pub messages: i64,
    pub users: i64,
}

/// Search results are bounded even on this channel.
const SEARCH_LIMIT: u32 = 200;

impl ToolSession {
    pub fn new(db: Arc<Database>, account: ServiceAccount) -> Self {
        Self { db, account }
    }

    pub fn list_messages(&self, skip: u32, limit: u32) -> Result<Vec<MessageRow>> {
        info!(account = %self.account.name, skip, limit, "tool channel: list messages");
        self.db.list_messages(skip, limit, None)
    }

    pub fn search_messages(&self, query: &str) -> Result<Vec<MessageRow>> {
        info!(account = %self.account.name, query, "tool channel: search messages");
        self.db.list_messages(0, SEARCH_LIMIT, Some(query))
    }

    /// Create a post on behalf of `user_id`. When the user has a stored API
    /// key, the supplied key is compared literally for the receipt's
    /// annotation.
    pub fn create_post(
        &self,
        user_id: i64,
        content: &str,
        api_key: Option<&str>,
    ) -> Result<PostReceipt> {
        let user = self
            .db
            .get_user_by_id(user_id)?
            .ok_or_else(|| anyhow!("user {} not found", user_id))?;

        let key_verified = user
            .api_key
            .as_deref()
            .map(|stored| api_key == Some(stored));

        let message = self.db.insert_message(content, None, None, user_id)?;

        info!(
            account = %self.account.name,
            user_id,
            message_id = message.id,
            key_verified = ?key_verified,
            "tool channel: created post"
        );
        Ok(PostReceipt {
            message,
            key_verified,
        })
    }

    /// Overwrite any message's content, regardless of owner.
    pub fn modify_post(&self, message_id: i64, content: &str) -> Result<MessageRow> {
        let row = self
            .db
            .update_message_unchecked(message_id, content)?
            .ok_or_else(|| anyhow!("message {} not found", message_id))?;

        info!(
            account = %self.account.name,
            message_id,
            owner_id = row.owner_id,
            "tool channel: modified post, ownership bypassed"
        );
        Ok(row)
    }

    /// Delete any message, regardless of owner.
    pub fn delete_post(&self, message_id: i64) -> Result<()> {
        if !self.db.delete_message_unchecked(message_id)? {
            return Err(anyhow!("message {} not found", message_id));
        }

        info!(
            account = %self.account.name,
            message_id,
            "tool channel: deleted post, ownership bypassed"
        );
        Ok(())
    }

    pub fn stats(&self) -> Result<BoardStats> {
        info!(account = %self.account.name, "tool channel: stats");
        Ok(BoardStats {
            messages: self.db.count_messages()?,
            users: self.db.count_users()?,
        })
    }

    pub fn user_api_key(&self, email: &str) -> Result<Option<String>> {
        info!(account = %self.account.name, email, "tool channel: api key lookup");
        let user = self
            .db
            .get_user_by_email(email)?
            .ok_or_else(|| anyhow!("user {} not found", email))?;
        Ok(user.api_key)
    }

    /// Out-of-band credential reset: overwrite the password for an existing
    /// account, or bootstrap the account if it does not exist yet. This is
    /// the only path besides registration that touches the password digest.
    pub fn reset_credentials(&self, email: &str, password: &str) -> Result<()> {
        let hashed = hash_password(password)?;

        if self.db.update_password(email, &hashed)? {
            info!(account = %self.account.name, email, "tool channel: password reset");
        } else {
            self.db
                .create_user(email, &hashed)?
                .ok_or_else(|| anyhow!("user {} appeared mid-reset", email))?;
            info!(account = %self.account.name, email, "tool channel: bootstrapped user");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_auth::password::verify_password;

    fn session() -> ToolSession {
        let db = Arc::new(Database::open_in_memory().unwrap());
        ToolSession::new(db, ServiceAccount::new("test-bot"))
    }

    fn add_user(session: &ToolSession, email: &str) -> i64 {
        session
            .db
            .create_user(email, "digest")
            .unwrap()
            .unwrap()
            .id
    }

    #[test]
    fn modify_and_delete_bypass_ownership() {
        let session = session();
        let alice = add_user(&session, "alice@x.com");
        let message = session.db.insert_message("hers", None, None, alice).unwrap();

        let row = session.modify_post(message.id, "moderated").unwrap();
        assert_eq!(row.content, "moderated");
        assert_eq!(row.owner_id, alice);

        session.delete_post(message.id).unwrap();
        assert!(session.delete_post(message.id).is_err());
    }

    #[test]
    fn create_post_annotates_key_verification() {
        let session = session();
        let user_id = add_user(&session, "a@x.com");

        // No stored key: no annotation either way.
        let receipt = session.create_post(user_id, "no key", None).unwrap();
        assert_eq!(receipt.key_verified, None);

        session.db.set_api_key(user_id, "stored-key").unwrap();

        let verified = session
            .create_post(user_id, "with key", Some("stored-key"))
            .unwrap();
        assert_eq!(verified.key_verified, Some(true));

        // Mismatch and absence are annotated, never denied.
        let mismatch = session
            .create_post(user_id, "wrong key", Some("other-key"))
            .unwrap();
        assert_eq!(mismatch.key_verified, Some(false));

        let absent = session.create_post(user_id, "missing key", None).unwrap();
        assert_eq!(absent.key_verified, Some(false));
        assert_eq!(session.stats().unwrap().messages, 4);
    }

    #[test]
    fn create_post_rejects_unknown_user() {
        let session = session();
        assert!(session.create_post(42, "ghost", None).is_err());
    }

    #[test]
    fn search_reads_all_users() {
        let session = session();
        let alice = add_user(&session, "alice@x.com");
        let bob = add_user(&session, "bob@x.com");
        session.db.insert_message("alpha one", None, None, alice).unwrap();
        session.db.insert_message("alpha two", None, None, bob).unwrap();

        assert_eq!(session.search_messages("alpha").unwrap().len(), 2);
        assert_eq!(session.list_messages(0, 10).unwrap().len(), 2);
    }

    #[test]
    fn reset_credentials_updates_or_bootstraps() {
        let session = session();

        session.reset_credentials("ops@x.com", "initial-pw").unwrap();
        let user = session.db.get_user_by_email("ops@x.com").unwrap().unwrap();
        assert!(verify_password("initial-pw", &user.hashed_password));

        session.reset_credentials("ops@x.com", "rotated-pw").unwrap();
        let user = session.db.get_user_by_email("ops@x.com").unwrap().unwrap();
        assert!(verify_password("rotated-pw", &user.hashed_password));
        assert!(!verify_password("initial-pw", &user.hashed_password));
    }

    #[test]
    fn api_key_lookup() {
        let session = session();
        let user_id = add_user(&session, "a@x.com");

        assert_eq!(session.user_api_key("a@x.com").unwrap(), None);
        session.db.set_api_key(user_id, "the-key").unwrap();
        assert_eq!(
            session.user_api_key("a@x.com").unwrap().as_deref(),
            Some("the-key")
        );
        assert!(session.user_api_key("nobody@x.com").is_err());
    }
}
