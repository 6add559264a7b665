//! Optimistic tree mutations backed by asynchronous disk operations
//!
//! Every mutation first validates against the [`TreeModel`], then applies the
//! change to the model immediately and hands the matching [`DiskOperation`] to a
//! spawned task. The task waits for earlier overlapping operations (see
//! [`PathQueue`]), runs against the [`FileSystemGateway`], and sends an
//! [`OperationReport`] on the report channel. Failed operations are not rolled
//! back; the report carries the folder to refresh to bring the view back in line
//! with the disk.

use super::{Clipboard, ClipboardMode, NodeId, PathQueue, TreeModel, unique_name};
use crate::gateway::{FileSystemGateway, GatewayError};
use crate::tree::{FileNode, NodeKind};
use crate::validation::{ValidationError, check_entry_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Identifier of one dispatched disk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User-facing category of a disk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Delete,
    Copy,
    Move,
}

impl OperationKind {
    /// Alert text shown when an operation of this kind fails
    #[must_use]
    pub const fn failure_alert(self) -> &'static str {
        match self {
            Self::Create => "creation failed",
            Self::Delete => "delete failed",
            Self::Copy => "copy failed",
            Self::Move => "move failed",
        }
    }
}

/// A disk primitive queued by a tree mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskOperation {
    CreateFile(PathBuf),
    CreateDirectory(PathBuf),
    DeleteFile(PathBuf),
    DeleteDirectory(PathBuf),
    CopyFile { from: PathBuf, to: PathBuf },
    CopyDirectory { from: PathBuf, to: PathBuf },
    MoveFile { from: PathBuf, to: PathBuf },
    MoveDirectory { from: PathBuf, to: PathBuf },
}

impl DiskOperation {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::CreateFile(_) | Self::CreateDirectory(_) => OperationKind::Create,
            Self::DeleteFile(_) | Self::DeleteDirectory(_) => OperationKind::Delete,
            Self::CopyFile { .. } | Self::CopyDirectory { .. } => OperationKind::Copy,
            Self::MoveFile { .. } | Self::MoveDirectory { .. } => OperationKind::Move,
        }
    }

    /// Every path the operation reads or writes
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            Self::CreateFile(path)
            | Self::CreateDirectory(path)
            | Self::DeleteFile(path)
            | Self::DeleteDirectory(path) => vec![path.clone()],
            Self::CopyFile { from, to }
            | Self::CopyDirectory { from, to }
            | Self::MoveFile { from, to }
            | Self::MoveDirectory { from, to } => vec![from.clone(), to.clone()],
        }
    }

    /// The path the operation is about, for logs and alerts
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::CreateFile(path)
            | Self::CreateDirectory(path)
            | Self::DeleteFile(path)
            | Self::DeleteDirectory(path) => path,
            Self::CopyFile { to, .. }
            | Self::CopyDirectory { to, .. }
            | Self::MoveFile { to, .. }
            | Self::MoveDirectory { to, .. } => to,
        }
    }

    async fn run(&self, gateway: &dyn FileSystemGateway) -> Result<(), GatewayError> {
        match self {
            Self::CreateFile(path) => gateway.create_file(path).await,
            Self::CreateDirectory(path) => gateway.create_directory(path).await,
            Self::DeleteFile(path) => gateway.delete_file(path).await,
            Self::DeleteDirectory(path) => gateway.delete_directory(path).await,
            Self::CopyFile { from, to } => gateway.copy_file(from, to).await,
            Self::CopyDirectory { from, to } => gateway.copy_directory(from, to).await,
            Self::MoveFile { from, to } => gateway.move_file(from, to).await,
            Self::MoveDirectory { from, to } => gateway.move_directory(from, to).await,
        }
    }
}

/// Completion notice for a dispatched operation
#[derive(Debug)]
pub struct OperationReport {
    pub id: OperationId,
    pub operation: DiskOperation,
    /// Folders whose on-disk contents should be re-read if the operation failed
    pub reconcile: Vec<PathBuf>,
    pub outcome: Result<(), GatewayError>,
}

impl OperationReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// User-facing alert for a failed operation
    #[must_use]
    pub fn alert(&self) -> Option<String> {
        self.outcome
            .as_ref()
            .err()
            .map(|err| format!("{}: {err}", self.operation.kind().failure_alert()))
    }
}

/// Receiving end of the report channel
#[derive(Debug)]
pub struct ReportReceiver {
    rx: mpsc::UnboundedReceiver<OperationReport>,
}

impl ReportReceiver {
    /// Next report, or `None` once the dispatcher and every task are gone
    pub async fn recv(&mut self) -> Option<OperationReport> {
        self.rx.recv().await
    }

    /// Reports that have already arrived
    pub fn drain(&mut self) -> Vec<OperationReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.rx.try_recv() {
            reports.push(report);
        }
        reports
    }
}

/// Applies tree mutations and dispatches their disk operations
pub struct OperationDispatcher {
    gateway: Arc<dyn FileSystemGateway>,
    queue: PathQueue,
    reports: mpsc::UnboundedSender<OperationReport>,
    clipboard: Clipboard,
    next_id: u64,
}

impl std::fmt::Debug for OperationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDispatcher")
            .field("queue", &self.queue)
            .field("clipboard", &self.clipboard)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

fn parent_dir(path: &Path) -> Vec<PathBuf> {
    path.parent().map(Path::to_path_buf).into_iter().collect()
}

/// Rewrite every path in `node` to live under `path`, renaming the root to the
/// last segment of `path`
fn rebase(mut node: FileNode, path: PathBuf) -> FileNode {
    if let Some(name) = path.file_name() {
        node.name = name.to_string_lossy().into_owned();
    }
    if let Some(children) = node.children.take() {
        node.children = Some(
            children
                .into_iter()
                .map(|child| {
                    let child_path = path.join(&child.name);
                    rebase(child, child_path)
                })
                .collect(),
        );
    }
    node.path = path;
    node
}

impl OperationDispatcher {
    /// Create a dispatcher and the receiver for its reports
    ///
    /// Operations are spawned with [`tokio::spawn`], so mutations must be issued
    /// from within a Tokio runtime.
    #[must_use]
    pub fn new(gateway: Arc<dyn FileSystemGateway>) -> (Self, ReportReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            gateway,
            queue: PathQueue::new(),
            reports: tx,
            clipboard: Clipboard::new(),
            next_id: 0,
        };
        (dispatcher, ReportReceiver { rx })
    }

    #[must_use]
    pub const fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Forget the clipboard, e.g. when the tree it points into is replaced
    pub fn clear_clipboard(&mut self) {
        self.clipboard.clear();
    }

    /// Operations dispatched and not yet finished
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.queue.in_flight()
    }

    fn dispatch(&mut self, operation: DiskOperation, reconcile: Vec<PathBuf>) -> OperationId {
        self.next_id += 1;
        let id = OperationId(self.next_id);
        let mut ticket = self.queue.register(operation.paths());
        let gateway = Arc::clone(&self.gateway);
        let reports = self.reports.clone();

        debug!(%id, ?operation, "dispatching disk operation");
        tokio::spawn(async move {
            ticket.ready().await;
            let outcome = operation.run(gateway.as_ref()).await;
            drop(ticket);

            match &outcome {
                Ok(()) => debug!(%id, target = %operation.target().display(), "disk operation finished"),
                Err(err) => warn!(%id, target = %operation.target().display(), error = %err, "disk operation failed"),
            }
            // The receiver may be gone during shutdown
            let _ = reports.send(OperationReport {
                id,
                operation,
                reconcile,
                outcome,
            });
        });
        id
    }

    fn folder(model: &TreeModel, id: NodeId) -> Result<PathBuf, ValidationError> {
        let node = model.get(id).ok_or(ValidationError::UnknownNode)?;
        if node.is_folder() {
            Ok(node.path.clone())
        } else {
            Err(ValidationError::NotAFolder(node.path.clone()))
        }
    }

    /// Validate a copy/move of `id` into `destination` and pick the new name
    ///
    /// The name avoids both the destination's children in the model and
    /// `on_disk`, the destination's listing (which may hold entries the tree
    /// does not show).
    fn plan_transfer(
        model: &TreeModel,
        id: NodeId,
        destination: NodeId,
        on_disk: &[String],
    ) -> Result<(PathBuf, PathBuf, String, NodeKind), ValidationError> {
        let node = model.get(id).ok_or(ValidationError::UnknownNode)?;
        let dest_path = Self::folder(model, destination)?;
        if model.is_ancestor_or_self(id, destination) {
            return Err(ValidationError::IntoItself(node.path.clone()));
        }

        let mut taken = model.child_names(Some(destination));
        taken.extend(on_disk.iter().map(String::as_str));
        let name = unique_name(&node.name, node.kind, &taken);
        let to = dest_path.join(&name);
        Ok((node.path.clone(), to, name, node.kind))
    }

    /// Add a new file or folder under `parent`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty or invalid, no kind was
    /// chosen, `parent` is not a folder, or the name is already taken there.
    pub fn create(
        &mut self,
        model: &mut TreeModel,
        parent: NodeId,
        name: &str,
        kind: Option<NodeKind>,
    ) -> Result<(NodeId, OperationId), ValidationError> {
        let name = check_entry_name(name)?;
        let kind = kind.ok_or(ValidationError::NoKind)?;
        let parent_path = Self::folder(model, parent)?;
        if model.child_names(Some(parent)).contains(&name) {
            return Err(ValidationError::AlreadyExists(name.to_string()));
        }

        let path = parent_path.join(name);
        let (node, operation) = match kind {
            NodeKind::File => (FileNode::file(&path), DiskOperation::CreateFile(path)),
            NodeKind::Folder => (FileNode::folder(&path, Vec::new()), DiskOperation::CreateDirectory(path)),
        };
        let id = model.insert(Some(parent), node);
        info!(path = %parent_path.join(name).display(), kind = kind.label(), "creating entry");
        Ok((id, self.dispatch(operation, vec![parent_path])))
    }

    /// Remove a node and its subtree
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if `id` is not in the model.
    pub fn delete(&mut self, model: &mut TreeModel, id: NodeId) -> Result<OperationId, ValidationError> {
        let removed = model.remove(id).ok_or(ValidationError::UnknownNode)?;
        if self.clipboard.peek().is_some_and(|(held, _)| !model.contains(held)) {
            self.clipboard.clear();
        }

        info!(path = %removed.path.display(), "deleting entry");
        let reconcile = parent_dir(&removed.path);
        let operation = if removed.is_folder() {
            DiskOperation::DeleteDirectory(removed.path)
        } else {
            DiskOperation::DeleteFile(removed.path)
        };
        Ok(self.dispatch(operation, reconcile))
    }

    /// Duplicate a node's subtree into `destination`
    ///
    /// The copy gets a ` (n)` suffix when its name is taken in the destination,
    /// including when copying into the node's own parent. `on_disk` lists names
    /// already present in the destination folder on disk.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if either node is unknown, `destination` is not
    /// a folder, or it lies inside the copied subtree.
    pub fn copy_to(
        &mut self,
        model: &mut TreeModel,
        id: NodeId,
        destination: NodeId,
        on_disk: &[String],
    ) -> Result<(NodeId, OperationId), ValidationError> {
        let (from, to, _, kind) = Self::plan_transfer(model, id, destination, on_disk)?;
        let snapshot = model.snapshot(id).ok_or(ValidationError::UnknownNode)?;
        let new_id = model.insert(Some(destination), rebase(snapshot, to.clone()));

        info!(from = %from.display(), to = %to.display(), "copying entry");
        let reconcile = parent_dir(&to);
        let operation = match kind {
            NodeKind::File => DiskOperation::CopyFile { from, to },
            NodeKind::Folder => DiskOperation::CopyDirectory { from, to },
        };
        Ok((new_id, self.dispatch(operation, reconcile)))
    }

    /// Relocate a node's subtree into `destination`
    ///
    /// # Errors
    ///
    /// Same conditions as [`copy_to`](Self::copy_to).
    pub fn move_to(
        &mut self,
        model: &mut TreeModel,
        id: NodeId,
        destination: NodeId,
        on_disk: &[String],
    ) -> Result<OperationId, ValidationError> {
        let (from, to, name, kind) = Self::plan_transfer(model, id, destination, on_disk)?;
        if !model.relocate(id, destination, &name) {
            return Err(ValidationError::UnknownNode);
        }

        info!(from = %from.display(), to = %to.display(), "moving entry");
        let mut reconcile = parent_dir(&from);
        reconcile.extend(parent_dir(&to));
        reconcile.dedup();
        let operation = match kind {
            NodeKind::File => DiskOperation::MoveFile { from, to },
            NodeKind::Folder => DiskOperation::MoveDirectory { from, to },
        };
        Ok(self.dispatch(operation, reconcile))
    }

    /// Drop `id` onto `target`: a move into the target folder
    ///
    /// # Errors
    ///
    /// Same conditions as [`move_to`](Self::move_to).
    pub fn drag(
        &mut self,
        model: &mut TreeModel,
        id: NodeId,
        target: NodeId,
        on_disk: &[String],
    ) -> Result<OperationId, ValidationError> {
        self.move_to(model, id, target, on_disk)
    }

    /// Put a node on the clipboard for copying
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if `id` is not in the model.
    pub fn copy(&mut self, model: &TreeModel, id: NodeId) -> Result<(), ValidationError> {
        self.hold(model, id, ClipboardMode::Copy)
    }

    /// Put a node on the clipboard for moving
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if `id` is not in the model.
    pub fn cut(&mut self, model: &TreeModel, id: NodeId) -> Result<(), ValidationError> {
        self.hold(model, id, ClipboardMode::Cut)
    }

    fn hold(&mut self, model: &TreeModel, id: NodeId, mode: ClipboardMode) -> Result<(), ValidationError> {
        if !model.contains(id) {
            return Err(ValidationError::UnknownNode);
        }
        self.clipboard.set(id, mode);
        Ok(())
    }

    /// Paste the clipboard node into `destination`
    ///
    /// A copied node stays on the clipboard; a cut node is cleared after the move.
    /// Returns the id of the pasted node (the new copy, or the moved node).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyClipboard` if nothing was copied or cut, and
    /// the [`copy_to`](Self::copy_to) errors otherwise.
    pub fn paste(
        &mut self,
        model: &mut TreeModel,
        destination: NodeId,
        on_disk: &[String],
    ) -> Result<(NodeId, OperationId), ValidationError> {
        let (held, mode) = self.clipboard.peek().ok_or(ValidationError::EmptyClipboard)?;
        if !model.contains(held) {
            self.clipboard.clear();
            return Err(ValidationError::UnknownNode);
        }

        match mode {
            ClipboardMode::Copy => self.copy_to(model, held, destination, on_disk),
            ClipboardMode::Cut => {
                let op = self.move_to(model, held, destination, on_disk)?;
                self.clipboard.clear();
                Ok((held, op))
            }
        }
    }
}
