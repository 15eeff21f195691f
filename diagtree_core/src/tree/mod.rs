//! The tree side of the boundary: nodes, the visible line layout, and the
//! [`TreeView`] trait a file-tree UI implements.

mod file_tree;

pub use file_tree::FileTree;

use std::collections::BTreeMap;

use serde::Serialize;

/// A stable identity for a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// A node in the file tree, as the diagnostics engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub absolute_path: String,
    pub is_directory: bool,
    pub is_open: bool,
}

impl TreeNode {
    pub fn file(id: NodeId, absolute_path: impl Into<String>) -> Self {
        Self {
            id,
            absolute_path: absolute_path.into(),
            is_directory: false,
            is_open: false,
        }
    }

    pub fn directory(id: NodeId, absolute_path: impl Into<String>, is_open: bool) -> Self {
        Self {
            id,
            absolute_path: absolute_path.into(),
            is_directory: true,
            is_open,
        }
    }
}

/// The visible nodes of a tree, keyed by display line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineNodeView {
    lines: BTreeMap<usize, TreeNode>,
}

impl LineNodeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a node on a line, replacing whatever was there.
    pub fn insert(&mut self, line: usize, node: TreeNode) {
        self.lines.insert(line, node);
    }

    pub fn with_node(mut self, line: usize, node: TreeNode) -> Self {
        self.insert(line, node);
        self
    }

    pub fn get(&self, line: usize) -> Option<&TreeNode> {
        self.lines.get(&line)
    }

    /// Iterates nodes in line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TreeNode)> {
        self.lines.iter().map(|(line, node)| (*line, node))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<(usize, TreeNode)> for LineNodeView {
    fn from_iter<I: IntoIterator<Item = (usize, TreeNode)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// A file tree UI whose visible lines can carry diagnostics.
pub trait TreeView: Send {
    /// Whether the tree's display surface exists and is loaded.
    ///
    /// Diagnostics cycles are skipped entirely while this is false.
    fn is_valid(&self) -> bool;

    /// The currently visible nodes, keyed by display line.
    fn nodes_by_line(&self) -> LineNodeView;
}
