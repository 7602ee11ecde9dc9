//! User sessions.
//!
//! Sessions are bearer tokens with a fixed 30-day lifetime. Validation never
//! mutates state; expired sessions linger until [`SessionManager::sweep_expired`]
//! removes them.

use crate::clock::Clock;
use crate::crypto::digest::fingerprint;
use crate::crypto::random::session_token;
use crate::store::document::{Session, User};
use crate::store::Vault;
use crate::{AuthError, VicatError};
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

/// Fixed session lifetime.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Issues, validates and expires user sessions.
pub struct SessionManager {
    vault: Arc<Vault>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Create a session manager over a shared vault.
    pub fn new(vault: Arc<Vault>, clock: Arc<dyn Clock>) -> Self {
        Self { vault, clock }
    }

    /// Start a new session for `user_id`.
    pub fn create_session(&self, user_id: Uuid) -> Result<Session, VicatError> {
        let now = self.clock.now_utc();
        let session = Session {
            token: session_token(),
            user_id,
            created_at: now,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        };

        self.vault.transact(|doc| {
            doc.sessions.push(session.clone());
            Ok(())
        })?;

        tracing::info!(
            user_id = %user_id,
            token_fp = %fingerprint(&session.token),
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Resolve a presented token to its user and session.
    ///
    /// # Errors
    /// - `MissingToken` - No token presented
    /// - `InvalidToken` - No session matches
    /// - `SessionExpired` - `now >= expires_at`
    /// - `UserNotFound` - The owning user no longer exists
    pub fn validate_session(&self, token: Option<&str>) -> Result<(User, Session), VicatError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let now = self.clock.now_utc();

        let outcome = self.vault.read(|doc| -> Result<(User, Session), AuthError> {
            let session = doc
                .sessions
                .iter()
                .find(|s| s.token == token)
                .ok_or(AuthError::InvalidToken)?;

            if session.is_expired(now) {
                return Err(AuthError::SessionExpired);
            }

            let user = doc.user(session.user_id).ok_or(AuthError::UserNotFound)?;
            Ok((user.clone(), session.clone()))
        })?;

        Ok(outcome?)
    }

    /// End a session. Unknown tokens are ignored.
    ///
    /// Returns whether a session was removed.
    pub fn destroy_session(&self, token: &str) -> Result<bool, VicatError> {
        let removed = self.vault.transact(|doc| {
            let before = doc.sessions.len();
            doc.sessions.retain(|s| s.token != token);
            Ok(doc.sessions.len() != before)
        })?;

        if removed {
            tracing::info!(token_fp = %fingerprint(token), "Session destroyed");
        }
        Ok(removed)
    }

    /// Remove every session whose expiry has passed.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep_expired(&self) -> Result<usize, VicatError> {
        let now = self.clock.now_utc();
        let removed = self.vault.transact(|doc| {
            let before = doc.sessions.len();
            doc.sessions.retain(|s| !s.is_expired(now));
            Ok(before - doc.sessions.len())
        })?;

        tracing::debug!(removed, "Expired sessions swept");
        Ok(removed)
    }
}
