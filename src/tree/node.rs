use serde::{Deserialize, Serialize};

/// Kind of node to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    File,
    Folder,
}

/// A folder owning an ordered list of children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) children: Vec<FileNode>,
    /// Display hint for tree views
    pub is_collapsed: bool,
}

/// A file holding a text payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub(crate) name: String,
    pub(crate) path: String,
    pub content: String,
}

/// A node in the file tree (file or folder)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    Folder(Folder),
    File(File),
}

impl Folder {
    /// Create a folder with no children
    pub fn new(name: impl Into<String>, is_collapsed: bool) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            children: Vec::new(),
            is_collapsed,
        }
    }

    pub fn children(&self) -> &[FileNode] {
        &self.children
    }

    /// Check if a direct child with this name exists
    pub fn has_child(&self, name: &str) -> bool {
        contains_name(&self.children, name)
    }
}

impl File {
    /// Create a file with the given content
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            content: content.into(),
        }
    }

    /// Editor language detected from the file extension
    pub fn language(&self) -> &'static str {
        detect_language(&self.name)
    }
}

impl FileNode {
    /// Create a new, empty file node
    pub fn new_file(name: impl Into<String>) -> Self {
        Self::File(File::new(name, ""))
    }

    /// Create a new folder node; fresh folders start collapsed
    pub fn new_folder(name: impl Into<String>) -> Self {
        Self::Folder(Folder::new(name, true))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::File(file) => &file.name,
        }
    }

    /// Path as stamped by the last resolve pass
    pub fn path(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.path,
            Self::File(file) => &file.path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Folder(_) => NodeKind::Folder,
            Self::File(_) => NodeKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Children of a folder, `None` for files
    pub fn children(&self) -> Option<&[FileNode]> {
        match self {
            Self::Folder(folder) => Some(&folder.children),
            Self::File(_) => None,
        }
    }

    /// Content of a file, `None` for folders
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Folder(_) => None,
            Self::File(file) => Some(&file.content),
        }
    }

    /// Editor language of a file, `None` for folders
    pub fn language(&self) -> Option<&'static str> {
        match self {
            Self::Folder(_) => None,
            Self::File(file) => Some(file.language()),
        }
    }

    /// Collapse state of a folder, `None` for files
    pub fn is_collapsed(&self) -> Option<bool> {
        match self {
            Self::Folder(folder) => Some(folder.is_collapsed),
            Self::File(_) => None,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Self::Folder(folder) => folder.name = name,
            Self::File(file) => file.name = name,
        }
    }

    pub(crate) fn set_path(&mut self, path: String) {
        match self {
            Self::Folder(folder) => folder.path = path,
            Self::File(file) => file.path = path,
        }
    }
}

impl From<Folder> for FileNode {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

impl From<File> for FileNode {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

/// Check whether a sibling list already holds `name`.
///
/// Matching is exact and ignores whether the existing node is a file or a folder.
pub fn contains_name(siblings: &[FileNode], name: &str) -> bool {
    siblings.iter().any(|n| n.name() == name)
}

/// Detect editor language from a file name
pub fn detect_language(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "html",
        "css" => "css",
        "scss" | "sass" => "scss",
        "less" => "less",
        "styl" => "stylus",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "coffee" => "coffeescript",
        "vue" => "vue",
        "svelte" => "svelte",
        "json" => "json",
        "md" | "markdown" => "markdown",
        "svg" | "xml" => "xml",
        "yaml" | "yml" => "yaml",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nodes() {
        let file = FileNode::new_file("script.js");
        assert!(file.is_file());
        assert_eq!(file.content(), Some(""));
        assert_eq!(file.children(), None);
        assert_eq!(file.is_collapsed(), None);

        let folder = FileNode::new_folder("styles");
        assert!(folder.is_folder());
        assert_eq!(folder.content(), None);
        assert_eq!(folder.children().map(|c| c.len()), Some(0));
        assert_eq!(folder.is_collapsed(), Some(true));
    }

    #[test]
    fn test_default_kind_and_language() {
        assert_eq!(NodeKind::default(), NodeKind::File);

        let file = FileNode::new_file("style.css");
        assert_eq!(file.language(), Some("css"));
        assert_eq!(FileNode::new_folder("styles.css").language(), None);
    }

    #[test]
    fn test_folder_has_child() {
        let mut folder = Folder::new("styles", false);
        folder.children.push(FileNode::new_file("style.css"));

        assert!(folder.has_child("style.css"));
        assert!(!folder.has_child("style.scss"));
    }

    #[test]
    fn test_contains_name_ignores_kind() {
        let siblings = vec![
            FileNode::new_folder("lib"),
            FileNode::new_file("index.html"),
        ];

        assert!(contains_name(&siblings, "lib"));
        assert!(contains_name(&siblings, "index.html"));
        assert!(!contains_name(&siblings, "Index.html"));
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("index.html"), "html");
        assert_eq!(detect_language("style.CSS"), "css");
        assert_eq!(detect_language("app.tsx"), "typescriptreact");
        assert_eq!(detect_language("Makefile"), "plaintext");
        assert_eq!(detect_language("notes.xyz"), "plaintext");
    }
}
