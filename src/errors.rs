//! vicat-keys error types.

use thiserror::Error;

/// Authentication failures produced by the admin and user guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No session token was presented.
    #[error("Session token missing")]
    MissingToken,

    /// No session matches the presented token.
    #[error("Invalid session token")]
    InvalidToken,

    /// The session exists but has passed its expiry.
    #[error("Session expired")]
    SessionExpired,

    /// The session's owning user no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Username or password was not presented.
    #[error("Username and password are required")]
    MissingCredentials,

    /// Username or password did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Coarse classification used by the request surface to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Missing, invalid or expired credentials or session.
    Auth,
    /// State conflict such as a reused code.
    Conflict,
    /// Unknown code or record.
    NotFound,
    /// Storage or hashing failure.
    Persistence,
}

/// Errors that can occur in any vicat-keys operation.
#[derive(Debug, Error)]
pub enum VicatError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Username is empty or contains characters outside `[A-Za-z0-9@]`.
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Password does not meet requirements.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Redeem code batch size out of range.
    #[error("Count must be between 1 and 100, got {0}")]
    InvalidCount(usize),

    /// Required request field is absent or empty.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Guard or session failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Username already belongs to another account.
    #[error("Username already exists")]
    UsernameTaken,

    /// Redeem code has already been exchanged for a key.
    #[error("Redeem code already used")]
    CodeAlreadyUsed,

    /// Redeemed codes cannot be deleted.
    #[error("Cannot delete a redeemed code")]
    CodeAlreadyRedeemed,

    /// Key is already on the blacklist.
    #[error("Key is already blacklisted")]
    AlreadyBlacklisted,

    /// No redeem code matches.
    #[error("Redeem code not found")]
    CodeNotFound,

    /// Document store I/O error.
    #[error("Store I/O error: {0}")]
    StoreIO(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl VicatError {
    /// Classify this error for the request surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VicatError::InvalidUsername(_)
            | VicatError::InvalidPassword(_)
            | VicatError::InvalidCount(_)
            | VicatError::MissingField(_) => ErrorKind::Validation,
            VicatError::Auth(_) => ErrorKind::Auth,
            VicatError::UsernameTaken
            | VicatError::CodeAlreadyUsed
            | VicatError::CodeAlreadyRedeemed
            | VicatError::AlreadyBlacklisted => ErrorKind::Conflict,
            VicatError::CodeNotFound => ErrorKind::NotFound,
            VicatError::StoreIO(_) | VicatError::Hashing(_) | VicatError::ConfigError(_) => {
                ErrorKind::Persistence
            }
        }
    }
}
