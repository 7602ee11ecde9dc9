//! In-memory document store.

use crate::store::document::Document;
use crate::store::DocumentStore;
use crate::VicatError;

/// Keeps the document in memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Document,
}

impl MemoryStore {
    /// Start from an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a pre-seeded document.
    pub fn with_document(document: Document) -> Self {
        Self { document }
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document, VicatError> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &Document) -> Result<(), VicatError> {
        self.document = document.clone();
        Ok(())
    }
}
