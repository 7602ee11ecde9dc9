//! File-based document store with atomic writes.
//!
//! Uses temp file + rename so a crash mid-write never leaves a torn document.

use crate::store::document::Document;
use crate::store::DocumentStore;
use crate::VicatError;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON document on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a file store at `path`, creating parent directories.
    pub fn new(path: PathBuf) -> Result<Self, VicatError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| VicatError::StoreIO(format!("Failed to create data dir: {}", e)))?;
        }
        Ok(Self { path })
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Document, VicatError> {
        if !self.path.exists() {
            return Ok(Document::default());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| VicatError::StoreIO(format!("Failed to read document: {}", e)))?;

        Document::from_json(&json)
    }

    fn save(&mut self, document: &Document) -> Result<(), VicatError> {
        let json = document.to_json()?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .map_err(|e| VicatError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| VicatError::StoreIO(format!("Failed to rename document: {}", e)))?;

        Ok(())
    }
}
