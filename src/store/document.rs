//! The persisted state document.
//!
//! Everything the server knows lives in one JSON document that is read and
//! written whole:
//!
//! ```text
//! { admin, users, sessions, redeem_codes, active_keys, blacklist }
//! ```

use crate::VicatError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The singleton administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Admin login name.
    pub username: String,

    /// Argon2 PHC hash of the admin password.
    pub password_hash: String,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user id.
    pub id: Uuid,

    /// Unique login name, `[A-Za-z0-9@]+`.
    pub username: String,

    /// Argon2 PHC hash of the password.
    pub password_hash: String,

    /// Optional contact address.
    #[serde(default)]
    pub email: Option<String>,

    /// Registration time.
    pub created_at: DateTime<Utc>,

    /// Keys obtained through redemption, oldest first.
    #[serde(default)]
    pub keys: Vec<String>,
}

/// A logged-in user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token.
    pub token: String,

    /// Owning user.
    pub user_id: Uuid,

    /// Login time.
    pub created_at: DateTime<Utc>,

    /// The session is invalid from this instant on.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A single-use code exchangeable for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCode {
    /// 12 characters of `[A-Z0-9]`.
    pub code: String,

    /// Set once, when the code is exchanged.
    #[serde(default)]
    pub redeemed: bool,

    /// Who redeemed it.
    #[serde(default)]
    pub redeemed_by: Option<Uuid>,

    /// When it was redeemed.
    #[serde(default)]
    pub redeemed_at: Option<DateTime<Utc>>,

    /// Issue time.
    pub created_at: DateTime<Utc>,
}

/// Status of an issued key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Usable.
    Active,
}

/// A key currently granting access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveKey {
    /// `vicat-xxxx-xxxx-xxxx`.
    pub key: String,

    /// Owning user.
    pub user_id: Uuid,

    /// Issue time.
    pub created_at: DateTime<Utc>,

    /// Key status.
    pub status: KeyStatus,
}

/// A permanently denied key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// The denied key.
    pub key: String,

    /// When it was blacklisted.
    pub blacklisted_at: DateTime<Utc>,
}

/// The whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Admin record, absent before first boot.
    #[serde(default)]
    pub admin: Option<Admin>,

    /// Registered users.
    #[serde(default)]
    pub users: Vec<User>,

    /// Live and not-yet-swept sessions.
    #[serde(default)]
    pub sessions: Vec<Session>,

    /// Issued redeem codes, redeemed or not.
    #[serde(default)]
    pub redeem_codes: Vec<RedeemCode>,

    /// Keys currently granting access.
    #[serde(default)]
    pub active_keys: Vec<ActiveKey>,

    /// Permanently denied keys.
    #[serde(default)]
    pub blacklist: Vec<BlacklistEntry>,
}

impl Document {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, VicatError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VicatError::StoreIO(format!("Failed to serialize document: {}", e)))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, VicatError> {
        serde_json::from_str(json)
            .map_err(|e| VicatError::StoreIO(format!("Failed to parse document: {}", e)))
    }

    /// Look up a user by id.
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Look up a user by exact username.
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Whether a username is held by a user or by the admin.
    pub fn username_taken(&self, username: &str) -> bool {
        self.user_by_name(username).is_some()
            || self.admin.as_ref().is_some_and(|a| a.username == username)
    }

    /// Whether a key is on the blacklist.
    pub fn is_blacklisted(&self, key: &str) -> bool {
        self.blacklist.iter().any(|e| e.key == key)
    }
}
