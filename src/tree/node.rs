//! The logical file tree
//!
//! A [`FileNode`] is one filesystem entry. Folders always carry a (possibly empty)
//! `children` list and files never do; the constructors enforce that.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File or folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

/// One filesystem entry in the displayed tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Last path segment
    pub name: String,
    /// Absolute path at the time the node was built or last relocated
    pub path: PathBuf,
    /// File or folder
    pub kind: NodeKind,
    /// Children in listing order; `Some` iff `kind` is `Folder`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    /// User selection flag
    #[serde(default)]
    pub selected: bool,
}

/// Last segment of `path`, or the whole path for roots like `/`
#[must_use]
pub fn name_of(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

impl FileNode {
    /// A file node
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name_of(&path),
            path,
            kind: NodeKind::File,
            children: None,
            selected: false,
        }
    }

    /// A folder node with the given children
    #[must_use]
    pub fn folder(path: impl Into<PathBuf>, children: Vec<Self>) -> Self {
        let path = path.into();
        Self {
            name: name_of(&path),
            path,
            kind: NodeKind::Folder,
            children: Some(children),
            selected: false,
        }
    }

    /// Builder-style selection flag
    #[must_use]
    pub const fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    /// Children, empty for files
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Total number of nodes in this subtree, including `self`
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Self::count).sum::<usize>()
    }

    /// Find a node in this subtree by path
    #[must_use]
    pub fn find(&self, path: &Path) -> Option<&Self> {
        if self.path == path {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(path))
    }
}
