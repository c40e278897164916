//! Plain nested records exchanged with storage and import sources.
//!
//! The record shape mirrors what the browser client persists for a creation:
//! `{ name, isFolder, content, children, isCollapsed }`. Records are turned into
//! a consistent [`Tree`] in one call, with paths assigned once at the end.

use serde::{Deserialize, Serialize};

use super::node::contains_name;
use super::path::split_path;
use super::{validate_name, File, FileNode, Folder, Tree, TreeError, TreeResult};

/// Nested description of a file or folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub name: String,
    #[serde(default)]
    pub is_folder: bool,
    /// File content; ignored for folders
    #[serde(default)]
    pub content: Option<String>,
    /// Folder children; ignored for files
    #[serde(default)]
    pub children: Option<Vec<NodeRecord>>,
    #[serde(default)]
    pub is_collapsed: Option<bool>,
}

impl NodeRecord {
    /// Create a file record
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_folder: false,
            content: Some(content.into()),
            children: None,
            is_collapsed: None,
        }
    }

    /// Create a folder record
    pub fn folder(name: impl Into<String>, children: Vec<NodeRecord>) -> Self {
        Self {
            name: name.into(),
            is_folder: true,
            content: None,
            children: Some(children),
            is_collapsed: None,
        }
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.is_collapsed = Some(collapsed);
        self
    }
}

impl Tree {
    /// Materialize a tree from nested records.
    ///
    /// Folders without an explicit collapse state come out expanded.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> TreeResult<Self> {
        let mut tree = Self {
            roots: build_nodes(records)?,
        };
        tree.assign_paths();
        Ok(tree)
    }

    /// Materialize a tree from a flat list of `(path, content)` file entries.
    ///
    /// Intermediate folders are created on demand, expanded, in first-seen order.
    pub fn from_flat_paths<P, C>(entries: impl IntoIterator<Item = (P, C)>) -> TreeResult<Self>
    where
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut tree = Self::new();
        for (path, content) in entries {
            let path = path.as_ref();
            let segments =
                split_path(path).ok_or_else(|| TreeError::InvalidName(path.to_string()))?;
            insert_flat(&mut tree.roots, path, &segments, content.into())?;
        }
        tree.assign_paths();
        Ok(tree)
    }

    /// Convert the tree back into nested records for saving
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.roots.iter().map(to_record).collect()
    }
}

fn build_nodes(records: impl IntoIterator<Item = NodeRecord>) -> TreeResult<Vec<FileNode>> {
    let mut nodes: Vec<FileNode> = Vec::new();
    for record in records {
        validate_name(&record.name)?;
        if contains_name(&nodes, &record.name) {
            return Err(TreeError::DuplicateName(record.name));
        }

        let node = if record.is_folder {
            let mut folder = Folder::new(record.name, record.is_collapsed.unwrap_or(false));
            folder.children = build_nodes(record.children.unwrap_or_default())?;
            FileNode::Folder(folder)
        } else {
            FileNode::File(File::new(record.name, record.content.unwrap_or_default()))
        };
        nodes.push(node);
    }
    Ok(nodes)
}

fn insert_flat(
    siblings: &mut Vec<FileNode>,
    full_path: &str,
    segments: &[&str],
    content: String,
) -> TreeResult<()> {
    let Some((name, rest)) = segments.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        if contains_name(siblings, name) {
            return Err(TreeError::DuplicateName(full_path.to_string()));
        }
        siblings.push(FileNode::File(File::new(*name, content)));
        return Ok(());
    }

    let index = match siblings.iter().position(|n| n.name() == *name) {
        Some(index) => index,
        None => {
            siblings.push(FileNode::Folder(Folder::new(*name, false)));
            siblings.len() - 1
        }
    };
    match &mut siblings[index] {
        FileNode::Folder(folder) => insert_flat(&mut folder.children, full_path, rest, content),
        FileNode::File(_) => Err(TreeError::DuplicateName(name.to_string())),
    }
}

fn to_record(node: &FileNode) -> NodeRecord {
    match node {
        FileNode::Folder(folder) => {
            NodeRecord::folder(&folder.name, folder.children.iter().map(to_record).collect())
                .collapsed(folder.is_collapsed)
        }
        FileNode::File(file) => NodeRecord::file(&file.name, &file.content),
    }
}
