//! Selection harvesting and export
//!
//! [`SelectionCollector::collect`] turns the selection flags of a tree into the
//! list of subtrees to export. A selected folder brings its whole subtree along
//! regardless of the flags below it; an unselected folder is transparent and only
//! its selected descendants are emitted. [`export`] then copies those subtrees
//! into a destination folder through the gateway.

use crate::gateway::{FileSystemGateway, GatewayError};
use crate::model::unique_name;
use crate::tree::{FileNode, NodeKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One entry to export, with its full subtree for folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportNode {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportNode>,
}

impl ExportNode {
    fn whole(node: &FileNode) -> Self {
        Self {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            children: node.children().iter().map(Self::whole).collect(),
        }
    }

    /// Number of entries in this subtree, including itself
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Gathers the selected part of a tree
pub struct SelectionCollector;

impl SelectionCollector {
    /// Selected subtrees in pre-order
    #[must_use]
    pub fn collect(trees: &[FileNode]) -> Vec<ExportNode> {
        let mut out = Vec::new();
        for tree in trees {
            Self::visit(tree, &mut out);
        }
        out
    }

    fn visit(node: &FileNode, out: &mut Vec<ExportNode>) {
        if node.selected {
            out.push(ExportNode::whole(node));
            return;
        }
        for child in node.children() {
            Self::visit(child, out);
        }
    }
}

/// Result of an export
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Destination paths written
    pub copied: Vec<PathBuf>,
    /// Sources that could not be copied
    pub failures: Vec<(PathBuf, GatewayError)>,
}

impl ExportSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copy every export root into `destination`
///
/// The destination folder is created if needed. Entries whose name already exists
/// there (or repeats among the exported roots) get a ` (n)` suffix. A failing
/// entry is recorded and the rest are still copied.
///
/// # Errors
///
/// Returns a `GatewayError` if the destination folder cannot be created.
pub async fn export(
    gateway: &dyn FileSystemGateway,
    nodes: &[ExportNode],
    destination: &Path,
) -> Result<ExportSummary, GatewayError> {
    gateway.create_directory(destination).await?;
    let mut taken = gateway.list_directory(destination).await?;
    let mut summary = ExportSummary::default();

    for node in nodes {
        let name = unique_name(&node.name, node.kind, &taken);
        let to = destination.join(&name);
        taken.push(name);

        let result = match node.kind {
            NodeKind::File => gateway.copy_file(&node.path, &to).await,
            NodeKind::Folder => gateway.copy_directory(&node.path, &to).await,
        };
        match result {
            Ok(()) => {
                info!(from = %node.path.display(), to = %to.display(), "exported");
                summary.copied.push(to);
            }
            Err(err) => {
                warn!(from = %node.path.display(), error = %err, "export failed");
                summary.failures.push((node.path.clone(), err));
            }
        }
    }
    Ok(summary)
}
