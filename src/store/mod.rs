//! Persistence gateway.
//!
//! [`DocumentStore`] is the whole-document load/save seam. [`Vault`] owns
//! one store behind a mutex and is the single point through which every
//! read-modify-write cycle runs, request-driven or scheduled.

pub mod document;
pub mod file;
pub mod memory;

use crate::VicatError;
use document::Document;
use std::sync::{Mutex, MutexGuard};

/// Atomic whole-document storage.
pub trait DocumentStore: Send {
    /// Read the full document. A store that has never been written yields
    /// an empty document.
    fn load(&self) -> Result<Document, VicatError>;

    /// Replace the full document.
    fn save(&mut self, document: &Document) -> Result<(), VicatError>;
}

/// Serializes all access to a [`DocumentStore`].
pub struct Vault {
    store: Mutex<Box<dyn DocumentStore>>,
}

impl Vault {
    /// Take ownership of a store.
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    /// Run a read-only query against a consistent snapshot.
    pub fn read<T>(&self, query: impl FnOnce(&Document) -> T) -> Result<T, VicatError> {
        let store = self.lock()?;
        let document = store.load()?;
        Ok(query(&document))
    }

    /// Load, mutate and save under the lock.
    ///
    /// If `mutation` fails its working copy is dropped and nothing is
    /// written.
    pub fn transact<T>(
        &self,
        mutation: impl FnOnce(&mut Document) -> Result<T, VicatError>,
    ) -> Result<T, VicatError> {
        let mut store = self.lock()?;
        let mut document = store.load()?;
        let output = mutation(&mut document)?;
        store.save(&document)?;
        Ok(output)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn DocumentStore>>, VicatError> {
        self.store
            .lock()
            .map_err(|_| VicatError::StoreIO("document lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document::BlacklistEntry;
    use crate::store::memory::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn entry(key: &str) -> BlacklistEntry {
        BlacklistEntry {
            key: key.to_string(),
            blacklisted_at: Utc::now(),
        }
    }

    #[test]
    fn test_transact_commits_on_ok() {
        let vault = Vault::new(MemoryStore::new());
        vault
            .transact(|doc| {
                doc.blacklist.push(entry("k1"));
                Ok(())
            })
            .unwrap();

        assert_eq!(vault.read(|doc| doc.blacklist.len()).unwrap(), 1);
    }

    #[test]
    fn test_transact_discards_on_err() {
        let vault = Vault::new(MemoryStore::new());
        let result: Result<(), _> = vault.transact(|doc| {
            doc.blacklist.push(entry("k1"));
            Err(VicatError::AlreadyBlacklisted)
        });

        assert!(matches!(result, Err(VicatError::AlreadyBlacklisted)));
        assert_eq!(vault.read(|doc| doc.blacklist.len()).unwrap(), 0);
    }

    #[test]
    fn test_concurrent_transactions_do_not_lose_updates() {
        let vault = Arc::new(Vault::new(MemoryStore::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let vault = Arc::clone(&vault);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        vault
                            .transact(|doc| {
                                doc.blacklist.push(entry(&format!("k{i}-{j}")));
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(vault.read(|doc| doc.blacklist.len()).unwrap(), 200);
    }
}
