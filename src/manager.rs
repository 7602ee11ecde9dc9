//! Key Server - the main public API for vicat-keys.
//!
//! The `KeyServer` wires every component onto one shared [`Vault`]:
//! - Accounts: registration, login, admin bootstrap
//! - Sessions: user session lifecycle
//! - Access gate: admin and user guards
//! - Key lifecycle: redeem codes, keys, blacklist

use crate::accounts::Accounts;
use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::crypto::credential::{CredentialStore, HashCost};
use crate::keys::KeyLifecycle;
use crate::policy::access::AccessGate;
use crate::session::SessionManager;
use crate::store::file::FileStore;
use crate::store::{DocumentStore, Vault};
use crate::VicatError;
use std::sync::Arc;

/// Main entry point for vicat-keys.
///
/// Create one instance per process and share it (e.g. behind an `Arc`).
pub struct KeyServer {
    vault: Arc<Vault>,
    sessions: Arc<SessionManager>,
    gate: AccessGate,
    keys: KeyLifecycle,
    accounts: Accounts,
}

impl KeyServer {
    /// Open the file-backed server described by `config` and bootstrap the
    /// admin if none exists yet.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The data directory cannot be created
    /// - The existing document cannot be read
    pub fn open(config: &ServerConfig) -> Result<Self, VicatError> {
        config.validate()?;
        let store = FileStore::new(config.data_path.clone())?;
        let server = Self::with_clock(store, config.hash_cost, Arc::new(SystemClock))?;
        server
            .accounts
            .ensure_admin(&config.admin_username, &config.admin_password)?;
        Ok(server)
    }

    /// Create a server over any document store, using the system clock.
    pub fn with_store(
        store: impl DocumentStore + 'static,
        hash_cost: HashCost,
    ) -> Result<Self, VicatError> {
        Self::with_clock(store, hash_cost, Arc::new(SystemClock))
    }

    /// Create a server with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn with_store_and_clock(
        store: impl DocumentStore + 'static,
        hash_cost: HashCost,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VicatError> {
        Self::with_clock(store, hash_cost, clock)
    }

    fn with_clock(
        store: impl DocumentStore + 'static,
        hash_cost: HashCost,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VicatError> {
        let credentials = CredentialStore::new(hash_cost)?;
        let vault = Arc::new(Vault::new(store));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&vault), Arc::clone(&clock)));

        Ok(Self {
            gate: AccessGate::new(Arc::clone(&vault), credentials.clone(), Arc::clone(&sessions)),
            keys: KeyLifecycle::new(Arc::clone(&vault), Arc::clone(&clock)),
            accounts: Accounts::new(
                Arc::clone(&vault),
                clock,
                credentials,
                Arc::clone(&sessions),
            ),
            sessions,
            vault,
        })
    }

    /// Registration, login and admin bootstrap.
    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// User sessions.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Admin and user guards.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Redeem codes, keys and blacklist.
    pub fn keys(&self) -> &KeyLifecycle {
        &self.keys
    }

    /// Direct document access, serialized with every other operation.
    pub fn vault(&self) -> &Vault {
        &self.vault
    }
}
