//! Admin and user guards.
//!
//! Two independent checks wrap every non-public operation:
//! - Admin: username + password re-verified against the stored hash on
//!   every call. Admins never get a session.
//! - User: a session token resolved through the [`SessionManager`].
//!
//! Neither guard mutates state.

use crate::crypto::credential::CredentialStore;
use crate::session::SessionManager;
use crate::store::document::{Session, User};
use crate::store::Vault;
use crate::{AuthError, VicatError};
use std::sync::Arc;

/// Proof that admin credentials were verified for this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    /// The admin's username.
    pub username: String,
}

/// A user resolved from a valid session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The session's owner.
    pub user: User,
    /// The session that authenticated the call.
    pub session: Session,
}

/// Evaluates the admin and user guards.
pub struct AccessGate {
    vault: Arc<Vault>,
    credentials: CredentialStore,
    sessions: Arc<SessionManager>,
}

impl AccessGate {
    /// Create a gate over shared state.
    pub fn new(
        vault: Arc<Vault>,
        credentials: CredentialStore,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            vault,
            credentials,
            sessions,
        }
    }

    /// Check presented admin credentials.
    ///
    /// # Errors
    /// - `MissingCredentials` - Username or password absent or empty
    /// - `InvalidCredentials` - No admin exists, username differs, or the
    ///   password does not verify
    pub fn admin_guard(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<AdminIdentity, VicatError> {
        let (Some(username), Some(password)) = (non_empty(username), non_empty(password)) else {
            return Err(AuthError::MissingCredentials.into());
        };

        let admin = self
            .vault
            .read(|doc| doc.admin.clone().filter(|a| a.username == username))?;

        let verified = match &admin {
            Some(a) => self.credentials.verify(password, &a.password_hash),
            None => self.credentials.verify_decoy(password),
        };
        let Some(admin) = admin.filter(|_| verified) else {
            tracing::warn!("Admin credential check failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        Ok(AdminIdentity {
            username: admin.username,
        })
    }

    /// Resolve a presented session token.
    ///
    /// Errors are those of [`SessionManager::validate_session`].
    pub fn user_guard(&self, token: Option<&str>) -> Result<AuthenticatedUser, VicatError> {
        let (user, session) = self.sessions.validate_session(token)?;
        Ok(AuthenticatedUser { user, session })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::crypto::credential::HashCost;
    use crate::store::document::{Admin, Document};
    use crate::store::memory::MemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn gate(with_admin: bool) -> (AccessGate, Arc<SessionManager>, Uuid) {
        let credentials = CredentialStore::new(HashCost::minimal()).unwrap();
        let user_id = Uuid::new_v4();
        let admin = with_admin.then(|| Admin {
            username: "admin".to_string(),
            password_hash: credentials.hash("s3cret").unwrap(),
        });
        let vault = Arc::new(Vault::new(MemoryStore::with_document(Document {
            admin,
            users: vec![User {
                id: user_id,
                username: "alice1".to_string(),
                password_hash: "unused".to_string(),
                email: None,
                created_at: Utc::now(),
                keys: vec![],
            }],
            ..Document::default()
        })));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&vault), Arc::new(SystemClock)));
        (
            AccessGate::new(vault, credentials, Arc::clone(&sessions)),
            sessions,
            user_id,
        )
    }

    fn auth_err<T: std::fmt::Debug>(result: Result<T, VicatError>) -> AuthError {
        match result {
            Err(VicatError::Auth(err)) => err,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_guard_accepts_correct_credentials() {
        let (gate, _, _) = gate(true);
        let identity = gate.admin_guard(Some("admin"), Some("s3cret")).unwrap();
        assert_eq!(identity.username, "admin");
    }

    #[test]
    fn test_admin_guard_rejects_wrong_password_with_matching_username() {
        let (gate, _, _) = gate(true);
        assert_eq!(
            auth_err(gate.admin_guard(Some("admin"), Some("S3cret"))),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_admin_guard_rejects_wrong_username() {
        let (gate, _, _) = gate(true);
        assert_eq!(
            auth_err(gate.admin_guard(Some("root"), Some("s3cret"))),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_admin_guard_missing_credentials() {
        let (gate, _, _) = gate(true);
        assert_eq!(
            auth_err(gate.admin_guard(None, Some("s3cret"))),
            AuthError::MissingCredentials
        );
        assert_eq!(
            auth_err(gate.admin_guard(Some("admin"), Some(""))),
            AuthError::MissingCredentials
        );
    }

    #[test]
    fn test_admin_guard_without_admin_record() {
        let (gate, _, _) = gate(false);
        assert_eq!(
            auth_err(gate.admin_guard(Some("admin"), Some("s3cret"))),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_user_guard_resolves_session() {
        let (gate, sessions, user_id) = gate(true);
        let session = sessions.create_session(user_id).unwrap();

        let authed = gate.user_guard(Some(session.token.as_str())).unwrap();
        assert_eq!(authed.user.id, user_id);
        assert_eq!(authed.session.token, session.token);

        assert_eq!(auth_err(gate.user_guard(None)), AuthError::MissingToken);
        assert_eq!(
            auth_err(gate.user_guard(Some("bogus"))),
            AuthError::InvalidToken
        );
    }
}
