//! Creation manager for open creations and their saved copies.
//!
//! This module provides:
//! - Open creation lifecycle (create, open, close, fork)
//! - Serialized intent application, one writer per creation
//! - Save/load through an optional creation store

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{Creation, CreationId, TreeIntent};
use crate::storage::{CreationMetadata, CreationStore, StorageError};
use crate::tree::{NodeRecord, TreeError};

/// Manager for open creations
pub struct CreationManager {
    /// Open creations
    creations: RwLock<HashMap<CreationId, Arc<RwLock<Creation>>>>,
    /// Backing store for saved creations
    store: Option<CreationStore>,
}

impl CreationManager {
    /// Create a manager without persistence
    pub fn new() -> Self {
        Self {
            creations: RwLock::new(HashMap::new()),
            store: None,
        }
    }

    /// Create a manager that saves to and loads from `store`
    pub fn with_store(store: CreationStore) -> Self {
        Self {
            creations: RwLock::new(HashMap::new()),
            store: Some(store),
        }
    }

    pub fn store(&self) -> Option<&CreationStore> {
        self.store.as_ref()
    }

    /// Register a creation as open, replacing any open copy with the same ID
    pub async fn open(&self, creation: Creation) -> Arc<RwLock<Creation>> {
        let id = creation.id.clone();
        let title = creation.title.clone();
        let handle = Arc::new(RwLock::new(creation));

        let mut creations = self.creations.write().await;
        creations.insert(id.clone(), handle.clone());

        info!("Opened creation: {} ({})", title, id);
        handle
    }

    /// Create and open a new creation, from the default template when `files` is absent
    pub async fn create(
        &self,
        title: &str,
        files: Option<Vec<NodeRecord>>,
    ) -> Result<Creation, ManagerError> {
        let creation = match files {
            Some(files) => Creation::with_files(title, files)?,
            None => Creation::new(title)?,
        };
        self.open(creation.clone()).await;
        Ok(creation)
    }

    /// Get an open creation by ID
    pub async fn get(&self, id: &str) -> Option<Arc<RwLock<Creation>>> {
        let creations = self.creations.read().await;
        creations.get(id).cloned()
    }

    /// Get an open creation, loading it from the store if needed
    pub async fn get_or_load(&self, id: &str) -> Result<Arc<RwLock<Creation>>, ManagerError> {
        if let Some(handle) = self.get(id).await {
            return Ok(handle);
        }
        let creation = self.load(id)?;
        Ok(self.open_if_absent(creation).await)
    }

    /// Register a loaded creation unless another task opened it first.
    ///
    /// Re-checked under the map write lock, so every caller ends up with the
    /// same handle and no applied intent is lost to a replaced copy.
    async fn open_if_absent(&self, creation: Creation) -> Arc<RwLock<Creation>> {
        let mut creations = self.creations.write().await;
        match creations.entry(creation.id.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                info!("Opened creation: {} ({})", creation.title, creation.id);
                entry.insert(Arc::new(RwLock::new(creation))).clone()
            }
        }
    }

    /// Close an open creation, discarding its in-memory tree
    pub async fn close(&self, id: &str) -> Option<Arc<RwLock<Creation>>> {
        let mut creations = self.creations.write().await;
        let removed = creations.remove(id);

        if removed.is_some() {
            info!("Closed creation: {}", id);
        }

        removed
    }

    /// Get the number of open creations
    pub async fn count(&self) -> usize {
        let creations = self.creations.read().await;
        creations.len()
    }

    /// List all open creation IDs
    pub async fn list_ids(&self) -> Vec<CreationId> {
        let creations = self.creations.read().await;
        creations.keys().cloned().collect()
    }

    /// Apply one intent to an open creation.
    ///
    /// The creation's write lock is held for the whole call, so intents are
    /// applied one after another and readers never see a half-applied change.
    pub async fn apply_intent(&self, id: &str, intent: TreeIntent) -> Result<Creation, ManagerError> {
        let handle = self.get_or_load(id).await?;
        let mut creation = handle.write().await;

        if let Err(e) = creation.apply(intent.clone()) {
            warn!("Rejected {:?} on {}: {}", intent, id, e);
            return Err(e.into());
        }

        Ok(creation.clone())
    }

    /// Clone the current state of a creation
    pub async fn snapshot(&self, id: &str) -> Result<Creation, ManagerError> {
        let handle = self.get_or_load(id).await?;
        let creation = handle.read().await;
        Ok(creation.clone())
    }

    /// Fork a creation and open the copy
    pub async fn fork(&self, id: &str) -> Result<Creation, ManagerError> {
        let fork = self.snapshot(id).await?.fork();
        self.open(fork.clone()).await;
        Ok(fork)
    }

    /// Persist an open creation
    pub async fn save(&self, id: &str) -> Result<CreationMetadata, ManagerError> {
        let store = self.store.as_ref().ok_or(ManagerError::NoStore)?;
        let handle = self
            .get(id)
            .await
            .ok_or_else(|| ManagerError::CreationNotFound(id.to_string()))?;

        let record = handle.read().await.to_record();
        let meta = store.save_creation(&record)?;
        store.flush()?;

        info!("Saved creation: {} ({} files)", id, meta.file_count);
        Ok(meta)
    }

    /// Load a saved creation without opening it
    pub fn load(&self, id: &str) -> Result<Creation, ManagerError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ManagerError::CreationNotFound(id.to_string()))?;
        let record = store
            .load_creation(id)?
            .ok_or_else(|| ManagerError::CreationNotFound(id.to_string()))?;
        Ok(Creation::from_record(record)?)
    }

    /// Close a creation and delete its saved copy
    pub async fn delete(&self, id: &str) -> Result<bool, ManagerError> {
        let was_open = self.close(id).await.is_some();
        let was_saved = match &self.store {
            Some(store) => store.delete_creation(id)?,
            None => false,
        };
        Ok(was_open || was_saved)
    }
}

impl Default for CreationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during creation operations
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Creation not found: {0}")]
    CreationNotFound(String),

    #[error("No creation store configured")]
    NoStore,

    #[error("File tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
