//! In-memory tree model
//!
//! [`TreeModel`] owns the displayed tree as an arena of nodes addressed by opaque
//! [`NodeId`]s. Views never hold node references: they hold ids and look nodes up
//! here, and [`ViewIndex`] maps visible rows back to ids. Every structural change
//! (insert, remove, relocate) goes through the model so parent links, child order
//! and paths stay consistent with each other.

pub mod clipboard;
pub mod dispatcher;
pub mod naming;
pub mod queue;

pub use clipboard::{Clipboard, ClipboardMode};
pub use dispatcher::{
    DiskOperation, OperationDispatcher, OperationId, OperationKind, OperationReport, ReportReceiver,
};
pub use naming::unique_name;
pub use queue::{PathQueue, Ticket};

use crate::tree::{FileNode, NodeKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Opaque handle to a node in a [`TreeModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// A node as stored in the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNode {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub selected: bool,
    /// View-only; folders start expanded
    pub expanded: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl ModelNode {
    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }
}

/// One visible line of the rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub id: NodeId,
    pub depth: usize,
}

/// Visible rows in display order, with the reverse id → row lookup
#[derive(Debug, Clone, Default)]
pub struct ViewIndex {
    rows: Vec<Row>,
    by_id: HashMap<NodeId, usize>,
}

impl ViewIndex {
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Node shown at a 1-based row number
    #[must_use]
    pub fn id_at(&self, row: usize) -> Option<NodeId> {
        row.checked_sub(1)
            .and_then(|index| self.rows.get(index))
            .map(|r| r.id)
    }

    /// 1-based row number a node is shown at, if visible
    #[must_use]
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        self.by_id.get(&id).map(|index| index + 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The displayed tree
#[derive(Debug, Clone, Default)]
pub struct TreeModel {
    nodes: HashMap<NodeId, ModelNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl TreeModel {
    /// An empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A model holding `trees` as its roots
    #[must_use]
    pub fn from_nodes(trees: Vec<FileNode>) -> Self {
        let mut model = Self::new();
        for tree in trees {
            model.insert(None, tree);
        }
        model
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the model
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a folder (empty for files and unknown ids)
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    /// Distance from the root list (roots are depth 0)
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        depth
    }

    /// Whether `ancestor` is `id` or lies on its parent chain
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    /// Whether `id` or any of its ancestors is selected
    ///
    /// A selected folder covers its whole subtree for export.
    #[must_use]
    pub fn is_ancestor_or_self_selected(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                return false;
            };
            if node.selected {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    /// First node (in display order) with the given path
    #[must_use]
    pub fn find_by_path(&self, path: &Path) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(&id)?;
            if node.path == path {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Names already used among a folder's children (or among the roots for `None`)
    #[must_use]
    pub fn child_names(&self, parent: Option<NodeId>) -> Vec<&str> {
        let ids = parent.map_or(self.roots.as_slice(), |p| self.children(p));
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.name.as_str())
            .collect()
    }

    fn alloc(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Insert a subtree as the last child of `parent` (or as a new root)
    ///
    /// Returns the id of the subtree's root.
    pub fn insert(&mut self, parent: Option<NodeId>, tree: FileNode) -> NodeId {
        let root_id = self.alloc();
        let mut pending = vec![(root_id, parent, tree)];

        while let Some((id, parent, node)) = pending.pop() {
            let FileNode {
                name,
                path,
                kind,
                children,
                selected,
            } = node;

            let mut child_ids = Vec::new();
            for child in children.into_iter().flatten() {
                let child_id = self.alloc();
                child_ids.push(child_id);
                pending.push((child_id, Some(id), child));
            }

            self.nodes.insert(
                id,
                ModelNode {
                    name,
                    path,
                    kind,
                    selected,
                    expanded: true,
                    parent,
                    children: child_ids,
                },
            );
        }

        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(root_id),
            None => self.roots.push(root_id),
        }
        root_id
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }
    }

    /// Remove a subtree and return it as a [`FileNode`]
    pub fn remove(&mut self, id: NodeId) -> Option<FileNode> {
        let snapshot = self.snapshot(id)?;
        self.detach(id);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
        Some(snapshot)
    }

    /// Move a subtree under `new_parent` as its last child, renaming it to
    /// `new_name` and recomputing every path below it
    ///
    /// Returns `false` (and changes nothing) if either id is unknown, the target is
    /// not a folder, or the target lies inside the moved subtree.
    pub fn relocate(&mut self, id: NodeId, new_parent: NodeId, new_name: &str) -> bool {
        let valid_target = self
            .nodes
            .get(&new_parent)
            .is_some_and(ModelNode::is_folder);
        if !self.contains(id) || !valid_target || self.is_ancestor_or_self(id, new_parent) {
            return false;
        }

        self.detach(id);
        let parent_path = self.nodes[&new_parent].path.clone();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
            node.name = new_name.to_string();
        }
        if let Some(parent_node) = self.nodes.get_mut(&new_parent) {
            parent_node.children.push(id);
        }
        self.reroot(id, parent_path.join(new_name));
        true
    }

    /// Set a node's path and recompute descendants as `parent path / name`
    fn reroot(&mut self, id: NodeId, path: PathBuf) {
        let mut stack = vec![(id, path)];
        while let Some((current, path)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            node.path.clone_from(&path);
            let children = node.children.clone();
            for child in children {
                if let Some(child_node) = self.nodes.get(&child) {
                    stack.push((child, path.join(&child_node.name)));
                }
            }
        }
    }

    /// Set the selection flag of one node
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        self.nodes.get_mut(&id).map(|node| node.selected = selected).is_some()
    }

    /// Flip the selection flag; returns the new state
    pub fn toggle_selected(&mut self, id: NodeId) -> Option<bool> {
        self.nodes.get_mut(&id).map(|node| {
            node.selected = !node.selected;
            node.selected
        })
    }

    /// Clear every selection flag
    pub fn clear_selection(&mut self) {
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
    }

    /// Expand or collapse a folder; returns `false` for files and unknown ids
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.is_folder() => {
                node.expanded = expanded;
                true
            }
            _ => false,
        }
    }

    /// Copy of a subtree as a [`FileNode`]
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> Option<FileNode> {
        let node = self.nodes.get(&id)?;
        let children = if node.is_folder() {
            Some(
                node.children
                    .iter()
                    .filter_map(|child| self.snapshot(*child))
                    .collect(),
            )
        } else {
            None
        };
        Some(FileNode {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            children,
            selected: node.selected,
        })
    }

    /// The whole model as [`FileNode`] trees in root order
    #[must_use]
    pub fn to_file_nodes(&self) -> Vec<FileNode> {
        self.roots.iter().filter_map(|id| self.snapshot(*id)).collect()
    }

    /// Visible rows: pre-order, skipping the contents of collapsed folders
    #[must_use]
    pub fn view(&self) -> ViewIndex {
        let mut index = ViewIndex::default();
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            index.by_id.insert(id, index.rows.len());
            index.rows.push(Row { id, depth });
            if node.is_folder() && node.expanded {
                stack.extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeModel {
        TreeModel::from_nodes(vec![
            FileNode::folder(
                "/r/docs",
                vec![
                    FileNode::file("/r/docs/x.txt"),
                    FileNode::folder("/r/docs/sub", vec![FileNode::file("/r/docs/sub/y.txt")]),
                ],
            ),
            FileNode::file("/r/notes.txt"),
        ])
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let trees = vec![
            FileNode::folder("/a", vec![FileNode::file("/a/1"), FileNode::folder("/a/b", vec![])]),
            FileNode::file("/c"),
        ];
        let model = TreeModel::from_nodes(trees.clone());
        assert_eq!(model.to_file_nodes(), trees);
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn test_view_rows_and_depth() {
        let model = sample();
        let view = model.view();
        let names: Vec<(&str, usize)> = view
            .rows()
            .iter()
            .map(|row| (model.get(row.id).unwrap().name.as_str(), row.depth))
            .collect();
        assert_eq!(
            names,
            vec![("docs", 0), ("x.txt", 1), ("sub", 1), ("y.txt", 2), ("notes.txt", 0)]
        );
        let y = view.id_at(4).unwrap();
        assert_eq!(model.depth(y), 2);
        assert_eq!(view.row_of(y), Some(4));
        assert!(view.id_at(0).is_none());
    }

    #[test]
    fn test_collapsed_folder_hides_children() {
        let mut model = sample();
        let docs = model.roots()[0];
        assert!(model.set_expanded(docs, false));
        let view = model.view();
        assert_eq!(view.len(), 2);
        assert!(!model.set_expanded(model.roots()[1], false));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut model = sample();
        let sub = model.find_by_path(Path::new("/r/docs/sub")).unwrap();
        let removed = model.remove(sub).unwrap();

        assert_eq!(removed.count(), 2);
        assert!(model.find_by_path(Path::new("/r/docs/sub/y.txt")).is_none());
        assert_eq!(model.child_names(Some(model.roots()[0])), vec!["x.txt"]);
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn test_relocate_recomputes_paths() {
        let mut model = sample();
        let sub = model.find_by_path(Path::new("/r/docs/sub")).unwrap();
        let docs = model.roots()[0];
        let notes_parent = model.insert(None, FileNode::folder("/r/archive", vec![]));

        assert!(model.relocate(sub, notes_parent, "sub"));
        assert_eq!(model.get(sub).unwrap().path, PathBuf::from("/r/archive/sub"));
        assert!(model.find_by_path(Path::new("/r/archive/sub/y.txt")).is_some());
        assert_eq!(model.child_names(Some(docs)), vec!["x.txt"]);
        assert_eq!(model.depth(sub), 1);
    }

    #[test]
    fn test_relocate_renames_nested_paths() {
        let mut model = sample();
        let docs = model.roots()[0];
        let archive = model.insert(None, FileNode::folder("/r/archive", vec![]));

        assert!(model.relocate(docs, archive, "docs (1)"));
        assert_eq!(model.get(docs).unwrap().name, "docs (1)");
        let y = model.find_by_path(Path::new("/r/archive/docs (1)/sub/y.txt")).unwrap();
        assert_eq!(model.get(y).unwrap().name, "y.txt");
        assert!(model.find_by_path(Path::new("/r/docs/sub/y.txt")).is_none());
    }

    #[test]
    fn test_relocate_into_own_subtree_refused() {
        let mut model = sample();
        let docs = model.roots()[0];
        let sub = model.find_by_path(Path::new("/r/docs/sub")).unwrap();
        assert!(!model.relocate(docs, sub, "docs"));
        assert!(!model.relocate(docs, docs, "docs"));
        assert_eq!(model.get(docs).unwrap().path, PathBuf::from("/r/docs"));
    }

    #[test]
    fn test_toggle_selection() {
        let mut model = sample();
        let notes = model.roots()[1];
        assert_eq!(model.toggle_selected(notes), Some(true));
        assert_eq!(model.toggle_selected(notes), Some(false));
        model.set_selected(notes, true);
        model.clear_selection();
        assert!(!model.get(notes).unwrap().selected);
    }
}
