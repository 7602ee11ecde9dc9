//! Read projections handed out of the core.
//!
//! These are what callers and the request surface see. None of them carry
//! password hashes or session tokens.

use crate::store::document::{ActiveKey, KeyStatus, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User id.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Keys obtained through redemption.
    pub keys: Vec<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            keys: user.keys.clone(),
        }
    }
}

/// A key as its owner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyView {
    /// The key string.
    pub key: String,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Key status.
    pub status: KeyStatus,
}

impl From<&ActiveKey> for KeyView {
    fn from(active: &ActiveKey) -> Self {
        Self {
            key: active.key.clone(),
            created_at: active.created_at,
            status: active.status,
        }
    }
}

/// An active key as the admin sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedKeyView {
    /// The key string.
    pub key: String,
    /// Owning user id.
    pub user_id: Uuid,
    /// Owning username, if the user still resolves.
    pub username: Option<String>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Key status.
    pub status: KeyStatus,
}

/// Every active key plus the blacklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInventory {
    /// Keys currently granting access.
    pub active_keys: Vec<OwnedKeyView>,
    /// Permanently denied keys.
    pub blacklist: Vec<crate::store::document::BlacklistEntry>,
}

/// Why a key check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenyReason {
    /// Key is on the blacklist.
    Blacklisted,
    /// Key is not an active key.
    Invalid,
}

impl DenyReason {
    /// Short machine-readable reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Blacklisted => "blacklisted",
            DenyReason::Invalid => "invalid",
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::Blacklisted => "Key has been blacklisted",
            DenyReason::Invalid => "Key is invalid",
        }
    }
}

/// Outcome of a public key check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Key grants access.
    Ok,
    /// Key is refused.
    Denied(DenyReason),
}

impl Verdict {
    /// Whether access is granted.
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}
