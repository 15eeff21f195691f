//! An in-memory file tree with open/closed directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{LineNodeView, NodeId, TreeNode, TreeView};
use crate::path::{CanonicalPath, canonical_path};

/// A directory tree rooted at a workspace directory.
///
/// The root itself is not displayed; its children start at the starting line
/// and every open directory contributes its own children directly below it.
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    nodes: Vec<TreeEntry>,
    top_level: Vec<usize>,
    starting_line: usize,
    loaded: bool,
}

#[derive(Debug, Clone)]
struct TreeEntry {
    node: TreeNode,
    name: String,
    children: Vec<usize>,
}

impl TreeEntry {
    /// Directories first, then by name.
    fn sort_key(&self) -> (bool, String) {
        (!self.node.is_directory, self.name.clone())
    }
}

impl FileTree {
    /// Creates an empty tree for a root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            nodes: Vec::new(),
            top_level: Vec::new(),
            starting_line: 0,
            loaded: true,
        }
    }

    /// Builds a tree from root-relative paths.
    ///
    /// Paths ending in `/` are directories; parents are created as needed.
    pub fn from_paths(root: impl Into<PathBuf>, paths: &[&str]) -> Self {
        let mut tree = Self::new(root);
        for path in paths {
            let is_directory = path.ends_with('/');
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let mut parent = None;
            for (i, segment) in segments.iter().enumerate() {
                let last = i + 1 == segments.len();
                parent = Some(tree.ensure_child(parent, segment, is_directory || !last));
            }
        }
        tree.sort();
        tree
    }

    /// Reads a directory from disk into a tree.
    ///
    /// Directories sort before files, names alphabetically. Unreadable
    /// subdirectories are kept but left empty, and entries below the root that
    /// cannot be read are skipped.
    pub fn scan(root: &Path) -> io::Result<Self> {
        let mut tree = Self::new(root);
        tree.scan_dir(root, None, true)?;
        tree.sort();
        debug!(
            "Scanned {} nodes under {}",
            tree.nodes.len(),
            root.display()
        );
        Ok(tree)
    }

    fn scan_dir(&mut self, dir: &Path, parent: Option<usize>, is_root: bool) -> io::Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if !is_root => {
                warn!("Could not read directory {}: {}", dir.display(), e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for entry in entries {
            let Some(entry) = tolerate_below_root(entry, is_root, dir)? else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().to_string();
            // Symlinks are not followed, so a linked directory shows as a leaf.
            let Some(file_type) = tolerate_below_root(entry.file_type(), is_root, &entry.path())?
            else {
                continue;
            };
            let is_directory = file_type.is_dir();
            let index = self.ensure_child(parent, &name, is_directory);
            if is_directory {
                self.scan_dir(&entry.path(), Some(index), false)?;
            }
        }
        Ok(())
    }

    fn ensure_child(&mut self, parent: Option<usize>, name: &str, is_directory: bool) -> usize {
        let siblings = match parent {
            Some(index) => &self.nodes[index].children,
            None => &self.top_level,
        };
        if let Some(existing) = siblings.iter().find(|i| self.nodes[**i].name == name) {
            return *existing;
        }

        let parent_path = match parent {
            Some(index) => PathBuf::from(&self.nodes[index].node.absolute_path),
            None => self.root.clone(),
        };
        let absolute_path = parent_path.join(name).to_string_lossy().to_string();
        let id = NodeId(self.nodes.len() as u64 + 1);
        let node = if is_directory {
            TreeNode::directory(id, absolute_path, false)
        } else {
            TreeNode::file(id, absolute_path)
        };

        let index = self.nodes.len();
        self.nodes.push(TreeEntry {
            node,
            name: name.to_string(),
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(index),
            None => self.top_level.push(index),
        }
        index
    }

    fn sort(&mut self) {
        let mut top_level = std::mem::take(&mut self.top_level);
        top_level.sort_by_key(|i| self.nodes[*i].sort_key());
        self.top_level = top_level;

        for index in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[index].children);
            children.sort_by_key(|i| self.nodes[*i].sort_key());
            self.nodes[index].children = children;
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The display line of the first visible node.
    pub fn starting_line(&self) -> usize {
        self.starting_line
    }

    pub fn set_starting_line(&mut self, line: usize) {
        self.starting_line = line;
    }

    /// Marks the display surface as unloaded; diagnostics cycles skip it.
    pub fn unload(&mut self) {
        self.loaded = false;
    }

    pub fn load(&mut self) {
        self.loaded = true;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets a node by id.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.nodes.get(index).map(|entry| &entry.node)
    }

    /// Finds the node at an absolute path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        self.find_index(&canonical_path(path))
            .map(|index| &self.nodes[index].node)
    }

    fn find_index(&self, path: &CanonicalPath) -> Option<usize> {
        self.nodes
            .iter()
            .position(|entry| &canonical_path(&entry.node.absolute_path) == path)
    }

    /// Opens a directory. Returns false when no directory exists at `path`.
    pub fn open(&mut self, path: &str) -> bool {
        self.set_open(path, Some(true))
    }

    /// Closes a directory. Returns false when no directory exists at `path`.
    pub fn close(&mut self, path: &str) -> bool {
        self.set_open(path, Some(false))
    }

    /// Flips a directory between open and closed.
    pub fn toggle(&mut self, path: &str) -> bool {
        self.set_open(path, None)
    }

    fn set_open(&mut self, path: &str, open: Option<bool>) -> bool {
        let Some(index) = self.find_index(&canonical_path(path)) else {
            return false;
        };
        let node = &mut self.nodes[index].node;
        if !node.is_directory {
            return false;
        }
        node.is_open = open.unwrap_or(!node.is_open);
        true
    }

    /// Opens every directory on the way to `path`, and `path` itself if it is a directory.
    pub fn reveal(&mut self, path: &str) -> bool {
        let target = canonical_path(path);
        let Some(found) = self.find_index(&target) else {
            return false;
        };
        for entry in &mut self.nodes {
            if entry.node.is_directory {
                let dir = canonical_path(&entry.node.absolute_path);
                if target.is_strict_descendant_of(&dir) {
                    entry.node.is_open = true;
                }
            }
        }
        if self.nodes[found].node.is_directory {
            self.nodes[found].node.is_open = true;
        }
        true
    }

    fn push_visible(&self, indices: &[usize], line: &mut usize, view: &mut LineNodeView) {
        for index in indices {
            let entry = &self.nodes[*index];
            view.insert(*line, entry.node.clone());
            *line += 1;
            if entry.node.is_directory && entry.node.is_open {
                self.push_visible(&entry.children, line, view);
            }
        }
    }

    /// Nesting depth of a node below the root (top level is 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let node = self.node(id)?;
        let path = PathBuf::from(&node.absolute_path);
        let relative = path.strip_prefix(&self.root).ok()?;
        Some(relative.components().count().saturating_sub(1))
    }

    /// The display name of a node (its last path segment).
    pub fn name(&self, id: NodeId) -> Option<&str> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.nodes.get(index).map(|entry| entry.name.as_str())
    }
}

impl TreeView for FileTree {
    fn is_valid(&self) -> bool {
        self.loaded
    }

    fn nodes_by_line(&self) -> LineNodeView {
        let mut view = LineNodeView::new();
        let mut line = self.starting_line;
        self.push_visible(&self.top_level, &mut line, &mut view);
        view
    }
}

/// Passes an I/O failure through at the root; below it, warns and yields `None`.
fn tolerate_below_root<T>(
    result: io::Result<T>,
    is_root: bool,
    path: &Path,
) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if !is_root => {
            warn!("Skipping {}: {}", path.display(), e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
