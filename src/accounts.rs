//! Registration, login and admin bootstrap.

use crate::clock::Clock;
use crate::crypto::credential::CredentialStore;
use crate::crypto::digest::fingerprint;
use crate::protocol::models::UserSummary;
use crate::session::SessionManager;
use crate::store::document::{Admin, Session, User};
use crate::store::Vault;
use crate::{AuthError, VicatError};
use std::sync::Arc;
use uuid::Uuid;

/// Registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Requested username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Optional contact address.
    pub email: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Admin credentials verified. No token is issued; admin calls re-send
    /// credentials every time.
    Admin,
    /// User credentials verified and a session started.
    User {
        /// The logged-in user.
        user: UserSummary,
        /// The new session.
        session: Session,
    },
}

/// Account management.
pub struct Accounts {
    vault: Arc<Vault>,
    clock: Arc<dyn Clock>,
    credentials: CredentialStore,
    sessions: Arc<SessionManager>,
}

impl Accounts {
    /// Create the account service over shared state.
    pub fn new(
        vault: Arc<Vault>,
        clock: Arc<dyn Clock>,
        credentials: CredentialStore,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            vault,
            clock,
            credentials,
            sessions,
        }
    }

    /// Create the admin record if none exists.
    ///
    /// Returns whether an admin was created.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, VicatError> {
        if self.vault.read(|doc| doc.admin.is_some())? {
            return Ok(false);
        }

        let password_hash = self.credentials.hash(password)?;
        let created = self.vault.transact(|doc| {
            if doc.admin.is_some() {
                return Ok(false);
            }
            doc.admin = Some(Admin {
                username: username.to_string(),
                password_hash,
            });
            Ok(true)
        })?;

        if created {
            tracing::warn!(
                username,
                "Bootstrap admin created; rotate these credentials immediately"
            );
        }
        Ok(created)
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `InvalidUsername` - Empty, or characters outside `[A-Za-z0-9@]`
    /// - `InvalidPassword` - Empty password
    /// - `UsernameTaken` - Held by another user or the admin
    pub fn register(&self, registration: Registration) -> Result<UserSummary, VicatError> {
        validate_username(&registration.username)?;
        if registration.password.is_empty() {
            return Err(VicatError::InvalidPassword(
                "password cannot be empty".to_string(),
            ));
        }

        // Hash outside the lock; uniqueness is re-checked inside it.
        let password_hash = self.credentials.hash(&registration.password)?;
        let user = User {
            id: Uuid::new_v4(),
            username: registration.username,
            password_hash,
            email: registration
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            created_at: self.clock.now_utc(),
            keys: Vec::new(),
        };

        let summary = self.vault.transact(|doc| {
            if doc.username_taken(&user.username) {
                return Err(VicatError::UsernameTaken);
            }
            let summary = UserSummary::from(&user);
            doc.users.push(user);
            Ok(summary)
        })?;

        tracing::info!(user_id = %summary.id, username = %summary.username, "User registered");
        Ok(summary)
    }

    /// Verify credentials and, for users, start a session.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable: an
    /// unknown name still pays for one full verification.
    ///
    /// # Errors
    /// - `MissingCredentials` - Empty username or password
    /// - `InvalidCredentials` - Credentials do not verify
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, VicatError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }

        let (admin, user) = self.vault.read(|doc| {
            (
                doc.admin.clone().filter(|a| a.username == username),
                doc.user_by_name(username).cloned(),
            )
        })?;

        if let Some(admin) = admin {
            if self.credentials.verify(password, &admin.password_hash) {
                tracing::info!("Admin login");
                return Ok(LoginOutcome::Admin);
            }
            tracing::warn!("Admin login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let verified = match &user {
            Some(u) => self.credentials.verify(password, &u.password_hash),
            None => self.credentials.verify_decoy(password),
        };
        let Some(user) = user.filter(|_| verified) else {
            tracing::warn!(username, "User login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        let session = self.sessions.create_session(user.id)?;
        Ok(LoginOutcome::User {
            user: UserSummary::from(&user),
            session,
        })
    }

    /// End a user session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> Result<(), VicatError> {
        if self.sessions.destroy_session(token)? {
            tracing::info!(token_fp = %fingerprint(token), "User logged out");
        }
        Ok(())
    }
}

/// Usernames are non-empty and limited to ASCII letters, digits and `@`.
pub fn validate_username(username: &str) -> Result<(), VicatError> {
    if username.is_empty() {
        return Err(VicatError::InvalidUsername(
            "username cannot be empty".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '@')
    {
        return Err(VicatError::InvalidUsername(
            "username may only contain letters, digits and @".to_string(),
        ));
    }
    Ok(())
}
