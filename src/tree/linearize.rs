use std::slice;

use super::{FileNode, Tree};

/// Lazy depth-first, pre-order walk over every node of a tree.
///
/// Folders are yielded before their descendants and children follow their
/// stored order. Collapse state is ignored. A clone continues from the current
/// position; call [`Tree::linearize`] again for a fresh walk.
#[derive(Debug, Clone)]
pub struct Linearize<'a> {
    stack: Vec<slice::Iter<'a, FileNode>>,
}

impl<'a> Linearize<'a> {
    fn new(roots: &'a [FileNode]) -> Self {
        Self {
            stack: vec![roots.iter()],
        }
    }

    /// Pair every node with its depth (root-level nodes are at depth 0)
    pub fn with_depth(self) -> WithDepth<'a> {
        WithDepth { inner: self }
    }

    fn next_with_depth(&mut self) -> Option<(usize, &'a FileNode)> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            match self.stack.last_mut()?.next() {
                Some(node) => {
                    if let Some(children) = node.children() {
                        self.stack.push(children.iter());
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a> Iterator for Linearize<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_depth().map(|(_, node)| node)
    }
}

/// Iterator returned by [`Linearize::with_depth`]
#[derive(Debug, Clone)]
pub struct WithDepth<'a> {
    inner: Linearize<'a>,
}

impl<'a> Iterator for WithDepth<'a> {
    type Item = (usize, &'a FileNode);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_with_depth()
    }
}

impl Tree {
    /// Flatten the tree into depth-first order, reflecting its current state
    pub fn linearize(&self) -> Linearize<'_> {
        Linearize::new(&self.roots)
    }

    /// File nodes only, in linearized order
    pub fn files(&self) -> impl Iterator<Item = &FileNode> + '_ {
        self.linearize().filter(|n| n.is_file())
    }
}
