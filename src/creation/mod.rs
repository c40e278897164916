//! Creation module for multi-file playground projects.
//!
//! This module handles:
//! - Creation lifecycle (new from template, open from records, fork)
//! - Tree intents dispatched by the UI, applied one at a time
//! - Flattened entries for tree views and quick-open
//! - Export packaging and code size

mod manager;

pub use manager::{CreationManager, ManagerError};

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tree::{FileNode, NodeKind, NodeRecord, Tree, TreeResult};

/// Unique identifier for a creation
pub type CreationId = String;

const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width" />
    <title>Untitled</title>
    <link rel="stylesheet" href="styles/style.css" />
  </head>
  <body>
    Hello World
    <script src="script.js"></script>
  </body>
</html>"#;

/// Files every new creation starts with
pub fn default_files() -> Vec<NodeRecord> {
    vec![
        NodeRecord::file("index.html", DEFAULT_INDEX_HTML),
        NodeRecord::folder("styles", vec![NodeRecord::file("style.css", "")]),
        NodeRecord::file("script.js", ""),
    ]
}

/// Title given to creations the user has not named yet
pub fn default_title(now: DateTime<Local>) -> String {
    format!(
        "Untitled {}-{}-{}:{:02}",
        now.day(),
        now.month(),
        now.hour(),
        now.minute()
    )
}

/// One open multi-file creation and the tree it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Creation {
    pub id: CreationId,
    pub title: String,
    /// Unix timestamp in milliseconds
    pub created_on: i64,
    /// Unix timestamp in milliseconds
    pub updated_on: i64,
    pub tree: Tree,
}

impl Creation {
    /// Create a new creation from the default template
    pub fn new(title: impl Into<String>) -> TreeResult<Self> {
        Self::with_files(title, default_files())
    }

    /// Create a new creation from supplied files (template or import)
    pub fn with_files(title: impl Into<String>, files: Vec<NodeRecord>) -> TreeResult<Self> {
        let now = Utc::now().timestamp_millis();
        Ok(Self {
            id: generate_creation_id(),
            title: title.into(),
            created_on: now,
            updated_on: now,
            tree: Tree::from_records(files)?,
        })
    }

    /// Copy this creation under a new identity
    pub fn fork(&self) -> Self {
        let now = Utc::now().timestamp_millis();
        let fork = Self {
            id: generate_creation_id(),
            title: format!("(Forked) {}", self.title),
            created_on: now,
            updated_on: now,
            tree: self.tree.clone(),
        };
        info!("Forked creation {} into {}", self.id, fork.id);
        fork
    }

    /// Apply one tree intent atomically
    pub fn apply(&mut self, intent: TreeIntent) -> TreeResult<()> {
        match intent {
            TreeIntent::AddFile { parent, name } => {
                self.tree.add(parent.as_deref(), &name, NodeKind::File)?;
            }
            TreeIntent::AddFolder { parent, name } => {
                self.tree.add(parent.as_deref(), &name, NodeKind::Folder)?;
            }
            TreeIntent::Rename { path, new_name } => {
                self.tree.rename(&path, &new_name)?;
            }
            TreeIntent::Remove { path } => {
                self.tree.remove(&path)?;
            }
            TreeIntent::Move {
                source,
                destination,
            } => {
                self.tree.move_node(&source, destination.as_deref())?;
            }
            TreeIntent::ToggleCollapse { path } => {
                self.tree.toggle_collapse(&path)?;
            }
            TreeIntent::UpdateContent { path, content } => {
                self.tree.update_content(&path, content)?;
            }
        }
        self.touch();
        Ok(())
    }

    /// Update last modification timestamp
    pub fn touch(&mut self) {
        self.updated_on = Utc::now().timestamp_millis();
    }

    /// Flattened view of every node for tree views and quick-open
    pub fn entries(&self) -> Vec<TreeEntry> {
        self.tree
            .linearize()
            .with_depth()
            .map(|(depth, node)| TreeEntry::new(depth, node))
            .collect()
    }

    /// Total byte size of all file contents
    pub fn code_size(&self) -> u64 {
        self.tree
            .files()
            .filter_map(FileNode::content)
            .map(|c| c.len() as u64)
            .sum()
    }

    /// Package every file, keyed by its path, for export
    pub fn export_bundle(&self) -> ExportBundle {
        let entries: Vec<ExportEntry> = self
            .tree
            .files()
            .map(|node| ExportEntry {
                path: node.path().to_string(),
                content: node.content().unwrap_or_default().to_string(),
            })
            .collect();
        let total_bytes = entries.iter().map(|e| e.content.len() as u64).sum();

        ExportBundle {
            title: self.title.clone(),
            entries,
            total_bytes,
        }
    }

    /// Convert to the record shape used by storage
    pub fn to_record(&self) -> CreationRecord {
        CreationRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            created_on: self.created_on,
            updated_on: self.updated_on,
            files: self.tree.to_records(),
        }
    }

    /// Rebuild a creation from its stored record
    pub fn from_record(record: CreationRecord) -> TreeResult<Self> {
        Ok(Self {
            id: record.id,
            title: record.title,
            created_on: record.created_on,
            updated_on: record.updated_on,
            tree: Tree::from_records(record.files)?,
        })
    }
}

/// Generate a unique creation ID
pub fn generate_creation_id() -> CreationId {
    uuid::Uuid::new_v4().to_string()
}

/// Serialized form of a creation, as saved and loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationRecord {
    pub id: CreationId,
    pub title: String,
    pub created_on: i64,
    pub updated_on: i64,
    pub files: Vec<NodeRecord>,
}

/// A tree change requested by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeIntent {
    /// Create an empty file (`parent` absent = root level)
    AddFile {
        #[serde(default)]
        parent: Option<String>,
        name: String,
    },
    /// Create an empty, collapsed folder
    AddFolder {
        #[serde(default)]
        parent: Option<String>,
        name: String,
    },
    Rename { path: String, new_name: String },
    Remove { path: String },
    /// Drag a node onto a folder (`destination` absent = root level)
    Move {
        source: String,
        #[serde(default)]
        destination: Option<String>,
    },
    ToggleCollapse { path: String },
    /// Write editor content back into a file
    UpdateContent { path: String, content: String },
}

/// Flattened tree node for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_folder: bool,
    /// Only meaningful for folders
    pub is_collapsed: bool,
    /// Editor language, files only
    pub language: Option<String>,
}

impl TreeEntry {
    fn new(depth: usize, node: &FileNode) -> Self {
        Self {
            path: node.path().to_string(),
            name: node.name().to_string(),
            depth,
            is_folder: node.is_folder(),
            is_collapsed: node.is_collapsed().unwrap_or(false),
            language: node.language().map(str::to_string),
        }
    }
}

/// Single file entry of an export package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub path: String,
    pub content: String,
}

/// All files of a creation, ready to be archived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub title: String,
    pub entries: Vec<ExportEntry>,
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_creation_uses_template() {
        let creation = Creation::new("Demo").unwrap();

        let paths: Vec<&str> = creation.tree.linearize().map(|n| n.path()).collect();
        assert_eq!(
            paths,
            vec!["index.html", "styles", "styles/style.css", "script.js"]
        );
        assert_eq!(
            creation.tree.get_node_by_path("styles").unwrap().is_collapsed(),
            Some(false)
        );
        assert!(creation.created_on > 0);
        assert_eq!(creation.id.len(), 36);
    }

    #[test]
    fn test_with_files() {
        let creation = Creation::with_files(
            "Imported",
            vec![NodeRecord::folder("src", vec![NodeRecord::file("main.js", "1")])],
        )
        .unwrap();

        assert_eq!(creation.tree.file_count(), 1);
        assert_eq!(
            creation.tree.get_node_by_path("src/main.js").unwrap().content(),
            Some("1")
        );

        let result = Creation::with_files("Broken", vec![NodeRecord::file("", "")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_title() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(default_title(now), "Untitled 7-3-9:05");
    }

    #[test]
    fn test_fork() {
        let original = Creation::new("Demo").unwrap();
        let fork = original.fork();

        assert_ne!(fork.id, original.id);
        assert_eq!(fork.title, "(Forked) Demo");
        assert_eq!(fork.tree, original.tree);
    }

    #[test]
    fn test_apply_intents() {
        let mut creation = Creation::new("Demo").unwrap();

        creation
            .apply(TreeIntent::AddFolder {
                parent: None,
                name: "lib".into(),
            })
            .unwrap();
        creation
            .apply(TreeIntent::Move {
                source: "script.js".into(),
                destination: Some("lib".into()),
            })
            .unwrap();
        creation
            .apply(TreeIntent::UpdateContent {
                path: "lib/script.js".into(),
                content: "console.log(1)".into(),
            })
            .unwrap();

        let script = creation.tree.get_node_by_path("lib/script.js").unwrap();
        assert_eq!(script.content(), Some("console.log(1)"));
    }

    #[test]
    fn test_apply_error_leaves_tree() {
        let mut creation = Creation::new("Demo").unwrap();
        let before = creation.tree.clone();

        let result = creation.apply(TreeIntent::AddFile {
            parent: None,
            name: "index.html".into(),
        });

        assert!(result.is_err());
        assert_eq!(creation.tree, before);
    }

    #[test]
    fn test_intent_json() {
        let intent: TreeIntent = serde_json::from_str(
            r#"{"type": "move", "source": "a.js", "destination": "lib"}"#,
        )
        .unwrap();
        assert_eq!(
            intent,
            TreeIntent::Move {
                source: "a.js".into(),
                destination: Some("lib".into()),
            }
        );

        let intent: TreeIntent =
            serde_json::from_str(r#"{"type": "add_file", "name": "b.js"}"#).unwrap();
        assert_eq!(
            intent,
            TreeIntent::AddFile {
                parent: None,
                name: "b.js".into(),
            }
        );
    }

    #[test]
    fn test_entries() {
        let creation = Creation::new("Demo").unwrap();
        let entries = creation.entries();

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1].name, "styles");
        assert!(entries[1].is_folder);
        assert!(!entries[1].is_collapsed);
        assert_eq!(entries[1].language, None);
        assert_eq!(entries[2].path, "styles/style.css");
        assert_eq!(entries[2].depth, 1);
        assert_eq!(entries[2].language.as_deref(), Some("css"));
    }

    #[test]
    fn test_export_bundle_skips_folders() {
        let mut creation = Creation::new("Demo").unwrap();
        creation.tree.update_content("styles/style.css", "p{}").unwrap();

        let bundle = creation.export_bundle();
        let paths: Vec<&str> = bundle.entries.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, vec!["index.html", "styles/style.css", "script.js"]);
        assert_eq!(bundle.total_bytes, creation.code_size());
        assert_eq!(
            bundle.total_bytes,
            (DEFAULT_INDEX_HTML.len() + "p{}".len()) as u64
        );
    }

    #[test]
    fn test_record_round_trip() {
        let creation = Creation::new("Demo").unwrap();

        let restored = Creation::from_record(creation.to_record()).unwrap();
        assert_eq!(restored, creation);
    }
}
