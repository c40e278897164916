//! Path resolution for the file tree.
//!
//! Paths are derived data: `assign_paths` is the only code that writes them,
//! and lookups walk node names rather than trusting previously stamped paths.

use super::{FileNode, Tree, TreeError, TreeResult, PATH_SEPARATOR};

/// A resolved node together with its position in the tree
#[derive(Debug, Clone, Copy)]
pub struct NodeLocation<'a> {
    pub node: &'a FileNode,
    /// Containing folder, `None` for root-level nodes
    pub parent: Option<&'a FileNode>,
    /// Position among the parent's children
    pub index: usize,
}

impl Tree {
    /// Stamp every node with the `/`-joined chain of ancestor names ending in its own.
    pub fn assign_paths(&mut self) {
        stamp_paths(&mut self.roots, "");
    }

    /// Resolve a path to its node
    pub fn get_node_by_path(&self, path: &str) -> TreeResult<&FileNode> {
        self.locate(path).map(|location| location.node)
    }

    /// Resolve a path to its node and parent folder
    pub fn locate(&self, path: &str) -> TreeResult<NodeLocation<'_>> {
        let indices = self.resolve_indices(path)?;
        let (&index, parents) = indices
            .split_last()
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;

        let mut parent = None;
        let mut siblings = self.roots.as_slice();
        for &i in parents {
            let folder = &siblings[i];
            siblings = folder.children().unwrap_or_default();
            parent = Some(folder);
        }

        Ok(NodeLocation {
            node: &siblings[index],
            parent,
            index,
        })
    }

    /// Check whether a path resolves to a node
    pub fn contains_path(&self, path: &str) -> bool {
        self.resolve_indices(path).is_ok()
    }

    /// Index chain from the roots down to the node at `path`
    pub(crate) fn resolve_indices(&self, path: &str) -> TreeResult<Vec<usize>> {
        let not_found = || TreeError::NotFound(path.to_string());
        let segments = split_path(path).ok_or_else(not_found)?;

        let mut indices = Vec::with_capacity(segments.len());
        let mut siblings = self.roots.as_slice();
        for segment in segments {
            let index = siblings
                .iter()
                .position(|n| n.name() == segment)
                .ok_or_else(not_found)?;
            indices.push(index);
            // Files have no children, so any further segment misses.
            siblings = siblings[index].children().unwrap_or_default();
        }

        Ok(indices)
    }

    pub(crate) fn node_at(&self, indices: &[usize]) -> Option<&FileNode> {
        let (&first, rest) = indices.split_first()?;
        let mut node = self.roots.get(first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    pub(crate) fn node_at_mut(&mut self, indices: &[usize]) -> Option<&mut FileNode> {
        let (&last, parents) = indices.split_last()?;
        self.siblings_at_mut(parents)?.get_mut(last)
    }

    /// Child list of the folder at `parents`, or the root sequence when empty
    pub(crate) fn siblings_at_mut(&mut self, parents: &[usize]) -> Option<&mut Vec<FileNode>> {
        let mut siblings = &mut self.roots;
        for &index in parents {
            let current = siblings;
            siblings = match current.get_mut(index)? {
                FileNode::Folder(folder) => &mut folder.children,
                FileNode::File(_) => return None,
            };
        }
        Some(siblings)
    }
}

fn stamp_paths(nodes: &mut [FileNode], prefix: &str) {
    for node in nodes {
        let path = join_path(prefix, node.name());
        if let FileNode::Folder(folder) = node {
            stamp_paths(&mut folder.children, &path);
        }
        node.set_path(path);
    }
}

/// Join a parent path and a child name
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

/// Split a path into name segments.
///
/// Returns `None` for an empty path or one with an empty segment, which covers
/// leading, trailing and doubled separators.
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeRecord;

    fn sample_tree() -> Tree {
        Tree::from_records(vec![
            NodeRecord::file("index.html", "H"),
            NodeRecord::folder("styles", vec![NodeRecord::file("style.css", "C")]),
        ])
        .unwrap()
    }

    fn all_paths(tree: &Tree) -> Vec<String> {
        tree.linearize().map(|n| n.path().to_string()).collect()
    }

    #[test]
    fn test_assign_paths() {
        let tree = sample_tree();

        assert_eq!(tree.get_node_by_path("index.html").unwrap().path(), "index.html");
        assert_eq!(
            tree.get_node_by_path("styles/style.css").unwrap().path(),
            "styles/style.css"
        );
    }

    #[test]
    fn test_assign_paths_idempotent() {
        let mut tree = sample_tree();
        let before = all_paths(&tree);

        tree.assign_paths();
        tree.assign_paths();

        assert_eq!(all_paths(&tree), before);
    }

    #[test]
    fn test_every_node_resolves_by_its_path() {
        let mut tree = sample_tree();
        tree.add(Some("styles"), "themes", crate::tree::NodeKind::Folder).unwrap();
        tree.add(Some("styles/themes"), "dark.css", crate::tree::NodeKind::File).unwrap();

        for node in tree.linearize() {
            let found = tree.get_node_by_path(node.path()).unwrap();
            assert!(std::ptr::eq(found, node));
        }
    }

    #[test]
    fn test_locate_returns_parent() {
        let tree = sample_tree();

        let root = tree.locate("index.html").unwrap();
        assert!(root.parent.is_none());
        assert_eq!(root.index, 0);

        let nested = tree.locate("styles/style.css").unwrap();
        assert_eq!(nested.parent.map(|p| p.name()), Some("styles"));
        assert_eq!(nested.index, 0);
    }

    #[test]
    fn test_missing_and_malformed_paths() {
        let tree = sample_tree();

        for path in [
            "",
            "/index.html",
            "styles/",
            "styles//style.css",
            "missing.js",
            "styles/missing.css",
            "index.html/child",
            "Styles/style.css",
        ] {
            assert_eq!(
                tree.get_node_by_path(path),
                Err(TreeError::NotFound(path.to_string())),
                "path {:?}",
                path
            );
        }
        assert!(tree.contains_path("styles"));
        assert!(!tree.contains_path("styles/"));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a.js"), "a.js");
        assert_eq!(join_path("lib/util", "a.js"), "lib/util/a.js");
    }
}
