//! Redeem code issuance, redemption, blacklisting and key checks.

use crate::clock::Clock;
use crate::crypto::digest::fingerprint;
use crate::keys::format::{generate_key, generate_redeem_code};
use crate::protocol::models::{
    DenyReason, KeyInventory, KeyView, OwnedKeyView, UserSummary, Verdict,
};
use crate::store::document::{ActiveKey, BlacklistEntry, KeyStatus, RedeemCode};
use crate::store::Vault;
use crate::{AuthError, VicatError};
use std::sync::Arc;
use uuid::Uuid;

/// Largest number of redeem codes issued in one batch.
pub const MAX_REDEEM_BATCH: usize = 100;

/// Owns every transition of redeem codes and keys.
pub struct KeyLifecycle {
    vault: Arc<Vault>,
    clock: Arc<dyn Clock>,
}

impl KeyLifecycle {
    /// Create the engine over a shared vault.
    pub fn new(vault: Arc<Vault>, clock: Arc<dyn Clock>) -> Self {
        Self { vault, clock }
    }

    /// Issue a batch of unredeemed codes.
    ///
    /// # Errors
    /// - `InvalidCount` - `count` outside `1..=100`
    pub fn issue_redeem_codes(&self, count: usize) -> Result<Vec<String>, VicatError> {
        if !(1..=MAX_REDEEM_BATCH).contains(&count) {
            return Err(VicatError::InvalidCount(count));
        }

        let now = self.clock.now_utc();
        let codes: Vec<String> = (0..count).map(|_| generate_redeem_code()).collect();

        self.vault.transact(|doc| {
            doc.redeem_codes.extend(codes.iter().map(|code| RedeemCode {
                code: code.clone(),
                redeemed: false,
                redeemed_by: None,
                redeemed_at: None,
                created_at: now,
            }));
            Ok(())
        })?;

        tracing::info!(count, "Redeem codes issued");
        Ok(codes)
    }

    /// Exchange an unredeemed code for a new key owned by `user_id`.
    ///
    /// Marking the code, creating the active key and appending to the
    /// user's key list commit together or not at all.
    ///
    /// # Errors
    /// - `CodeNotFound` - No such code
    /// - `CodeAlreadyUsed` - Code was redeemed before
    /// - `UserNotFound` - `user_id` does not resolve
    pub fn redeem(&self, code: &str, user_id: Uuid) -> Result<String, VicatError> {
        let now = self.clock.now_utc();

        let key = self.vault.transact(|doc| {
            let code_idx = doc
                .redeem_codes
                .iter()
                .position(|c| c.code == code)
                .ok_or(VicatError::CodeNotFound)?;
            if doc.redeem_codes[code_idx].redeemed {
                return Err(VicatError::CodeAlreadyUsed);
            }
            let user_idx = doc
                .users
                .iter()
                .position(|u| u.id == user_id)
                .ok_or(AuthError::UserNotFound)?;

            let key = generate_key();

            let redeemed = &mut doc.redeem_codes[code_idx];
            redeemed.redeemed = true;
            redeemed.redeemed_by = Some(user_id);
            redeemed.redeemed_at = Some(now);

            doc.active_keys.push(ActiveKey {
                key: key.clone(),
                user_id,
                created_at: now,
                status: KeyStatus::Active,
            });
            doc.users[user_idx].keys.push(key.clone());

            Ok(key)
        })?;

        tracing::info!(
            user_id = %user_id,
            code_fp = %fingerprint(code),
            key_fp = %fingerprint(&key),
            "Redeem code exchanged for key"
        );
        Ok(key)
    }

    /// Delete a code that has not been redeemed.
    ///
    /// # Errors
    /// - `CodeNotFound` - No such code
    /// - `CodeAlreadyRedeemed` - Redeemed codes are kept as history
    pub fn delete_redeem_code(&self, code: &str) -> Result<(), VicatError> {
        self.vault.transact(|doc| {
            let idx = doc
                .redeem_codes
                .iter()
                .position(|c| c.code == code)
                .ok_or(VicatError::CodeNotFound)?;
            if doc.redeem_codes[idx].redeemed {
                return Err(VicatError::CodeAlreadyRedeemed);
            }
            doc.redeem_codes.remove(idx);
            Ok(())
        })?;

        tracing::info!(code_fp = %fingerprint(code), "Redeem code deleted");
        Ok(())
    }

    /// Permanently deny a key and drop it from the active set.
    ///
    /// Keys that were never issued may be blacklisted ahead of time.
    ///
    /// # Errors
    /// - `AlreadyBlacklisted` - Key is already denied
    pub fn blacklist_key(&self, key: &str) -> Result<BlacklistEntry, VicatError> {
        let now = self.clock.now_utc();

        let (entry, was_active) = self.vault.transact(|doc| {
            if doc.is_blacklisted(key) {
                return Err(VicatError::AlreadyBlacklisted);
            }

            let entry = BlacklistEntry {
                key: key.to_string(),
                blacklisted_at: now,
            };
            doc.blacklist.push(entry.clone());

            let before = doc.active_keys.len();
            doc.active_keys.retain(|k| k.key != key);
            Ok((entry, doc.active_keys.len() != before))
        })?;

        tracing::warn!(key_fp = %fingerprint(key), was_active, "Key blacklisted");
        Ok(entry)
    }

    /// Decide whether a key grants access.
    ///
    /// The blacklist is consulted first and always wins.
    pub fn check_key(&self, key: &str) -> Result<Verdict, VicatError> {
        let verdict = self.vault.read(|doc| {
            if doc.is_blacklisted(key) {
                return Verdict::Denied(DenyReason::Blacklisted);
            }
            let active = doc
                .active_keys
                .iter()
                .any(|k| k.key == key && k.status == KeyStatus::Active);
            if active {
                Verdict::Ok
            } else {
                Verdict::Denied(DenyReason::Invalid)
            }
        })?;

        tracing::debug!(key_fp = %fingerprint(key), ?verdict, "Key checked");
        Ok(verdict)
    }

    /// Active keys owned by `user_id`.
    pub fn list_user_keys(&self, user_id: Uuid) -> Result<Vec<KeyView>, VicatError> {
        self.vault.read(|doc| {
            doc.active_keys
                .iter()
                .filter(|k| k.user_id == user_id)
                .map(KeyView::from)
                .collect()
        })
    }

    /// Every active key with its owner, plus the blacklist.
    pub fn list_all_keys(&self) -> Result<KeyInventory, VicatError> {
        self.vault.read(|doc| KeyInventory {
            active_keys: doc
                .active_keys
                .iter()
                .map(|k| OwnedKeyView {
                    key: k.key.clone(),
                    user_id: k.user_id,
                    username: doc.user(k.user_id).map(|u| u.username.clone()),
                    created_at: k.created_at,
                    status: k.status,
                })
                .collect(),
            blacklist: doc.blacklist.clone(),
        })
    }

    /// Every user, without credentials.
    pub fn list_all_users(&self) -> Result<Vec<UserSummary>, VicatError> {
        self.vault
            .read(|doc| doc.users.iter().map(UserSummary::from).collect())
    }

    /// Every redeem code, redeemed or not.
    pub fn list_all_redeem_codes(&self) -> Result<Vec<RedeemCode>, VicatError> {
        self.vault.read(|doc| doc.redeem_codes.clone())
    }
}
