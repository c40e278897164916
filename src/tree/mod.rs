//! Virtual file tree backing multi-file creations.
//!
//! This module provides the in-memory folder/file structure of one creation:
//! - Tree store with ordered roots and nested children
//! - Path resolution and stamping after every structural change
//! - Mutation operations (add, rename, remove, move, collapse toggle)
//! - Depth-first linearization for tab strips, quick-open and packaging
//! - Materialization from nested records or flat path lists

mod linearize;
mod node;
mod ops;
mod path;
mod record;

pub use linearize::{Linearize, WithDepth};
pub use node::{contains_name, detect_language, File, FileNode, Folder, NodeKind};
pub use path::NodeLocation;
pub use record::NodeRecord;

/// Separator used when joining node names into a path
pub const PATH_SEPARATOR: char = '/';

/// Ordered sequence of root-level nodes owned by one creation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    roots: Vec<FileNode>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Root-level nodes in stored order
    pub fn roots(&self) -> &[FileNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes (files and folders)
    pub fn node_count(&self) -> usize {
        self.linearize().count()
    }

    /// Number of file nodes
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Number of folder nodes
    pub fn folder_count(&self) -> usize {
        self.linearize().filter(|n| n.is_folder()).count()
    }
}

/// Errors that can occur during file tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Name already exists in folder: {0}")]
    DuplicateName(String),

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Cannot move {path} into its own subtree ({destination})")]
    CyclicMove { path: String, destination: String },

    #[error("Invalid node name: {0:?}")]
    InvalidName(String),
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Check that a name can be used for a node.
///
/// Names are non-empty and never contain the path separator.
pub fn validate_name(name: &str) -> TreeResult<()> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}
