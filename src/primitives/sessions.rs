//! Session tokens.

use crate::error::Result;
use crate::types::{Authentication, Authenticator, SessionToken};
use std::sync::Arc;

/// Session operations.
///
/// Access via `db.sessions`.
pub struct Sessions {
    db: Arc<warden_engine::Database>,
}

impl Sessions {
    pub(crate) fn new(db: Arc<warden_engine::Database>) -> Self {
        Self { db }
    }

    /// Exchange a credential for a session token.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let session = db.sessions.issue("cred-ada")?;
    /// let user = db.sessions.authenticate(&session.token).user();
    /// ```
    pub fn issue(&self, credential: &str) -> Result<SessionToken> {
        Ok(self.db.issue_token(credential)?)
    }

    /// Check a token.
    pub fn authenticate(&self, token: &str) -> Authentication {
        self.db.authenticate(token)
    }

    /// Drop a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.db.revoke_token(token)
    }

    /// Drop expired tokens. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.db.purge_expired_tokens()
    }

    /// Number of tokens held.
    pub fn count(&self) -> usize {
        self.db.session_count()
    }
}
