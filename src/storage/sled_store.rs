//! Sled-based storage implementation for creations.
//!
//! This module provides persistent storage for saved creations using the Sled
//! embedded database. It supports:
//! - Full creation records (nested file tree included)
//! - Metadata listing without decoding whole trees
//! - Deletion of a creation and its metadata together

use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{CreationMetadata, StorageConfig};
use crate::creation::CreationRecord;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Sled database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Corruption detected in creation: {0}")]
    Corruption(String),

    #[error("Storage initialization failed: {0}")]
    InitFailed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Tree names for different data types
const TREE_CREATIONS: &str = "creations";
const TREE_METADATA: &str = "metadata";

/// Sled-based store for saved creations
#[derive(Clone)]
pub struct CreationStore {
    db: Arc<Db>,
    creations: Tree,
    metadata: Tree,
}

impl CreationStore {
    /// Open or create a store at the configured path
    pub fn open(config: StorageConfig) -> StorageResult<Self> {
        let path = Path::new(&config.path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::InitFailed(format!("Failed to create directory: {}", e))
            })?;
        }

        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_size)
            .flush_every_ms(if config.flush_interval_ms > 0 {
                Some(config.flush_interval_ms)
            } else {
                None
            })
            .open()?;

        let creations = db.open_tree(TREE_CREATIONS)?;
        let metadata = db.open_tree(TREE_METADATA)?;

        Ok(Self {
            db: Arc::new(db),
            creations,
            metadata,
        })
    }

    /// Store a creation record, replacing any earlier save
    pub fn save_creation(&self, record: &CreationRecord) -> StorageResult<CreationMetadata> {
        let meta = CreationMetadata::from_record(record);
        let key = record.id.as_bytes();

        self.creations.insert(key, bincode::serialize(record)?)?;
        self.metadata.insert(key, bincode::serialize(&meta)?)?;

        debug!("Saved creation {} ({} files)", record.id, meta.file_count);
        Ok(meta)
    }

    /// Load a creation record
    pub fn load_creation(&self, id: &str) -> StorageResult<Option<CreationRecord>> {
        match self.creations.get(id.as_bytes())? {
            Some(bytes) => {
                let record: CreationRecord = bincode::deserialize(&bytes)?;
                if record.id != id {
                    return Err(StorageError::Corruption(format!(
                        "key {} holds creation {}",
                        id, record.id
                    )));
                }
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Check if a creation exists
    pub fn creation_exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.creations.contains_key(id.as_bytes())?)
    }

    /// Delete a creation and its metadata
    pub fn delete_creation(&self, id: &str) -> StorageResult<bool> {
        let key = id.as_bytes();
        let removed = self.creations.remove(key)?;
        self.metadata.remove(key)?;
        Ok(removed.is_some())
    }

    /// Load metadata for one creation
    pub fn get_metadata(&self, id: &str) -> StorageResult<Option<CreationMetadata>> {
        match self.metadata.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List metadata for all saved creations, most recently updated first
    pub fn list_metadata(&self) -> StorageResult<Vec<CreationMetadata>> {
        let mut items = Vec::new();
        for item in self.metadata.iter() {
            let (_, value) = item?;
            let meta: CreationMetadata = bincode::deserialize(&value)?;
            items.push(meta);
        }
        items.sort_by(|a, b| b.updated_on.cmp(&a.updated_on));
        Ok(items)
    }

    /// Force flush all pending writes to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl Drop for CreationStore {
    fn drop(&mut self) {
        // Attempt to flush on drop, but don't panic
        let _ = self.db.flush();
    }
}
