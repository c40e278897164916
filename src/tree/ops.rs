//! Mutation operations on the file tree.
//!
//! Every operation validates completely before touching the tree, so a failed
//! call leaves it exactly as it was. Successful calls end with a fresh
//! `assign_paths` pass before returning.

use tracing::debug;

use super::node::contains_name;
use super::{validate_name, FileNode, NodeKind, Tree, TreeError, TreeResult};

impl Tree {
    /// Check whether `name` exists directly under a folder (`None` = root level).
    ///
    /// Files and folders share one namespace, so either kind matches.
    pub fn exists_in_folder(&self, folder: Option<&str>, name: &str) -> TreeResult<bool> {
        match folder {
            None => Ok(contains_name(&self.roots, name)),
            Some(path) => match self.get_node_by_path(path)? {
                FileNode::Folder(dir) => Ok(dir.has_child(name)),
                FileNode::File(_) => Err(TreeError::NotAFolder(path.to_string())),
            },
        }
    }

    /// Append a new file or folder as the last child of `parent` (`None` = root level)
    pub fn add(&mut self, parent: Option<&str>, name: &str, kind: NodeKind) -> TreeResult<&FileNode> {
        validate_name(name)?;
        let mut indices = self.folder_indices(parent)?;

        let siblings = self
            .siblings_at_mut(&indices)
            .ok_or_else(|| TreeError::NotAFolder(parent.unwrap_or_default().to_string()))?;
        if contains_name(siblings, name) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }

        let node = match kind {
            NodeKind::File => FileNode::new_file(name),
            NodeKind::Folder => FileNode::new_folder(name),
        };
        siblings.push(node);
        indices.push(siblings.len() - 1);

        self.assign_paths();
        debug!("Added {:?} {} under {:?}", kind, name, parent);

        self.node_at(&indices)
            .ok_or_else(|| TreeError::NotFound(name.to_string()))
    }

    /// Rename the node at `path` in place; descendants follow on the next resolve
    pub fn rename(&mut self, path: &str, new_name: &str) -> TreeResult<&FileNode> {
        validate_name(new_name)?;
        let indices = self.resolve_indices(path)?;
        let (&index, parents) = indices
            .split_last()
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;

        let siblings = self
            .siblings_at_mut(parents)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;
        let collides = siblings
            .iter()
            .enumerate()
            .any(|(i, n)| i != index && n.name() == new_name);
        if collides {
            return Err(TreeError::DuplicateName(new_name.to_string()));
        }

        siblings[index].set_name(new_name.to_string());

        self.assign_paths();
        debug!("Renamed {} to {}", path, new_name);

        self.node_at(&indices)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))
    }

    /// Detach the node at `path` together with its subtree.
    ///
    /// The detached subtree is handed back to the caller and keeps the paths it
    /// had before removal.
    pub fn remove(&mut self, path: &str) -> TreeResult<FileNode> {
        let indices = self.resolve_indices(path)?;
        let (&index, parents) = indices
            .split_last()
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;

        let removed = self
            .siblings_at_mut(parents)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?
            .remove(index);

        self.assign_paths();
        debug!("Removed {}", path);

        Ok(removed)
    }

    /// Move the node at `source` to the end of `destination` (`None` = root level).
    ///
    /// Ownership of the whole subtree is transferred; nothing is copied.
    pub fn move_node(&mut self, source: &str, destination: Option<&str>) -> TreeResult<&FileNode> {
        let source_indices = self.resolve_indices(source)?;
        let mut dest_indices = self.folder_indices(destination)?;

        if dest_indices.starts_with(&source_indices) {
            return Err(TreeError::CyclicMove {
                path: source.to_string(),
                destination: destination.unwrap_or_default().to_string(),
            });
        }

        let (&index, parents) = source_indices
            .split_last()
            .ok_or_else(|| TreeError::NotFound(source.to_string()))?;
        let name = self
            .node_at(&source_indices)
            .map(|n| n.name().to_string())
            .ok_or_else(|| TreeError::NotFound(source.to_string()))?;
        if self.exists_in_folder(destination, &name)? {
            return Err(TreeError::DuplicateName(name));
        }

        let node = self
            .siblings_at_mut(parents)
            .ok_or_else(|| TreeError::NotFound(source.to_string()))?
            .remove(index);

        // Detaching shifts later siblings on the source level down by one.
        let depth = parents.len();
        if dest_indices.len() > depth
            && dest_indices.starts_with(parents)
            && dest_indices[depth] > index
        {
            dest_indices[depth] -= 1;
        }

        // `folder_indices` guarantees the destination is a folder.
        let children = self
            .siblings_at_mut(&dest_indices)
            .ok_or_else(|| TreeError::NotAFolder(destination.unwrap_or_default().to_string()))?;
        children.push(node);
        dest_indices.push(children.len() - 1);

        self.assign_paths();
        debug!("Moved {} into {:?}", source, destination);

        self.node_at(&dest_indices)
            .ok_or_else(|| TreeError::NotFound(source.to_string()))
    }

    /// Flip the collapse state of the folder at `path`, returning the new state
    pub fn toggle_collapse(&mut self, path: &str) -> TreeResult<bool> {
        let indices = self.resolve_indices(path)?;
        let collapsed = match self.node_at_mut(&indices) {
            Some(FileNode::Folder(folder)) => {
                folder.is_collapsed = !folder.is_collapsed;
                folder.is_collapsed
            }
            Some(FileNode::File(_)) => return Err(TreeError::NotAFolder(path.to_string())),
            None => return Err(TreeError::NotFound(path.to_string())),
        };

        self.assign_paths();
        debug!("Toggled {} collapsed={}", path, collapsed);

        Ok(collapsed)
    }

    /// Replace the content of the file at `path`
    pub fn update_content(&mut self, path: &str, content: impl Into<String>) -> TreeResult<()> {
        let indices = self.resolve_indices(path)?;
        match self.node_at_mut(&indices) {
            Some(FileNode::File(file)) => {
                file.content = content.into();
                Ok(())
            }
            Some(FileNode::Folder(_)) => Err(TreeError::NotAFile(path.to_string())),
            None => Err(TreeError::NotFound(path.to_string())),
        }
    }

    /// Resolve a folder target to its index chain; the root sequence is empty
    fn folder_indices(&self, folder: Option<&str>) -> TreeResult<Vec<usize>> {
        let Some(path) = folder else {
            return Ok(Vec::new());
        };
        let indices = self.resolve_indices(path)?;
        match self.node_at(&indices) {
            Some(node) if node.is_folder() => Ok(indices),
            Some(_) => Err(TreeError::NotAFolder(path.to_string())),
            None => Err(TreeError::NotFound(path.to_string())),
        }
    }
}
