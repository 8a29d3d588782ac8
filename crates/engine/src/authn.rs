//! Session tokens
//!
//! A user's credential is exchanged for a random URL-safe token with an
//! expiry. Tokens live in memory only and are never written to snapshots.
//! This is a reference authenticator: it makes no cryptographic claims
//! beyond drawing the token from the thread-local CSPRNG.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use warden_core::{Clock, UserId};

/// Random bytes per token (16 base64 characters)
pub const TOKEN_BYTES: usize = 12;

/// Outcome of presenting a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum Authentication {
    /// The token is live and belongs to this user
    Valid(UserId),
    /// The token exists but its expiry has passed
    Expired,
    /// No such token
    Unknown,
}

impl Authentication {
    /// The authenticated user, if the token is valid
    pub fn user(&self) -> Option<UserId> {
        match self {
            Authentication::Valid(user) => Some(*user),
            _ => None,
        }
    }
}

/// Maps a bearer token to a user
pub trait Authenticator: Send + Sync {
    /// Check a token
    fn authenticate(&self, token: &str) -> Authentication;
}

/// An issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Bearer token
    pub token: String,
    /// User the token was issued to
    pub user: UserId,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Check if the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory token table
pub struct TokenRegistry {
    tokens: DashMap<String, SessionToken>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("tokens", &self.tokens.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl TokenRegistry {
    /// Create a registry issuing tokens that live for `ttl`
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        TokenRegistry {
            tokens: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Issue a fresh token for `user`
    pub fn issue(&self, user: UserId) -> SessionToken {
        let issued_at = self.clock.now();
        loop {
            let session = SessionToken {
                token: generate_token(),
                user,
                issued_at,
                expires_at: issued_at + self.ttl,
            };
            // Retry on the (astronomically unlikely) collision
            if let dashmap::mapref::entry::Entry::Vacant(slot) =
                self.tokens.entry(session.token.clone())
            {
                slot.insert(session.clone());
                info!(user_id = %user, expires_at = %session.expires_at, "issued session token");
                return session;
            }
        }
    }

    /// Drop a token; returns whether it existed
    pub fn revoke(&self, token: &str) -> bool {
        let removed = self.tokens.remove(token).is_some();
        if removed {
            debug!("revoked session token");
        }
        removed
    }

    /// Drop every token issued to `user`; returns how many were dropped
    pub fn revoke_user(&self, user: UserId) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, session| session.user != user);
        before.saturating_sub(self.tokens.len())
    }

    /// Drop expired tokens; returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.tokens.len();
        self.tokens.retain(|_, session| !session.is_expired_at(now));
        let purged = before.saturating_sub(self.tokens.len());
        if purged > 0 {
            debug!(purged, "purged expired session tokens");
        }
        purged
    }

    /// Drop every token; returns how many were dropped
    pub fn clear(&self) -> usize {
        let dropped = self.tokens.len();
        self.tokens.clear();
        dropped
    }

    /// Number of tokens held (including expired ones not yet purged)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if no tokens are held
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for TokenRegistry {
    fn authenticate(&self, token: &str) -> Authentication {
        match self.tokens.get(token) {
            None => Authentication::Unknown,
            Some(session) if session.is_expired_at(self.clock.now()) => Authentication::Expired,
            Some(session) => Authentication::Valid(session.user),
        }
    }
}
