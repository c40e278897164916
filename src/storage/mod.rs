//! Storage module for persisting creations using Sled.
//!
//! Saved creations are stored as bincode-encoded records: the full nested file
//! tree under one key, plus a small metadata entry used for listings.

mod sled_store;

pub use sled_store::{CreationStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};

use crate::creation::CreationRecord;

/// Metadata stored alongside each saved creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationMetadata {
    /// Unique creation identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Unix timestamp (ms) of creation
    pub created_on: i64,
    /// Unix timestamp (ms) of last modification
    pub updated_on: i64,
    /// Number of files in the tree
    pub file_count: usize,
    /// Total size of file contents in bytes
    pub size_bytes: u64,
}

impl CreationMetadata {
    /// Summarize a creation record
    pub fn from_record(record: &CreationRecord) -> Self {
        let mut file_count = 0;
        let mut size_bytes = 0u64;
        let mut pending: Vec<_> = record.files.iter().collect();
        while let Some(node) = pending.pop() {
            if node.is_folder {
                pending.extend(node.children.iter().flatten());
            } else {
                file_count += 1;
                size_bytes += node.content.as_ref().map_or(0, |c| c.len() as u64);
            }
        }

        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            created_on: record.created_on,
            updated_on: record.updated_on,
            file_count,
            size_bytes,
        }
    }
}

/// Configuration for the storage layer
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the Sled database directory
    pub path: String,
    /// Cache size in bytes (default: 64MB)
    pub cache_size: u64,
    /// Flush interval in milliseconds (0 = flush only on demand)
    pub flush_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/creations.sled".to_string(),
            cache_size: 64 * 1024 * 1024, // 64MB
            flush_interval_ms: 500,
        }
    }
}

impl StorageConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    pub fn with_flush_interval(mut self, interval_ms: u64) -> Self {
        self.flush_interval_ms = interval_ms;
        self
    }
}
