//! Explorer session: the user-facing command surface
//!
//! An [`ExplorerSession`] owns everything one explorer window would: the opened
//! roots, the search area and criteria, the displayed [`TreeModel`], the
//! [`OperationDispatcher`] (and with it the clipboard) and the [`Dialog`] used for
//! open/save pickers. Each method is one user command. Mutations change the model
//! before returning; their disk outcomes arrive later on the [`ReportReceiver`]
//! handed out by [`ExplorerSession::new`].

use crate::ExplorerError;
use crate::config::{ExplorerConfig, SearchDefaults};
use crate::gateway::FileSystemGateway;
use crate::model::{
    ClipboardMode, NodeId, OperationDispatcher, OperationId, ReportReceiver, TreeModel,
};
use crate::selection::{ExportSummary, SelectionCollector, export};
use crate::tree::{
    BuildFailure, BuildOutput, NodeKind, SearchCriteria, SearchFilter, TreeBuilder, WalkOptions,
};
use crate::ui::Dialog;
use crate::validation::ValidationError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Non-error user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A search finished without matches; the displayed tree is unchanged
    NoResults,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResults => write!(f, "No results found"),
        }
    }
}

/// Outcome of a command that (re)builds the tree
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Entries now displayed
    pub nodes: usize,
    /// Branches that could not be read
    pub failures: Vec<BuildFailure>,
    /// Set when the build produced nothing to show
    pub notice: Option<Notice>,
}

/// Snapshot for the `status` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub roots: Vec<PathBuf>,
    pub search_area: Vec<PathBuf>,
    pub criteria: SearchDefaults,
    /// Query of the search currently displayed, if any
    pub active_query: Option<String>,
    pub entries: usize,
    pub selected: usize,
    pub clipboard: Option<(PathBuf, ClipboardMode)>,
    pub in_flight: usize,
}

/// The roots and filter the displayed tree was built from
#[derive(Debug, Clone, Default)]
struct LastBuild {
    roots: Vec<PathBuf>,
    criteria: Option<SearchCriteria>,
}

/// One explorer window's worth of state
pub struct ExplorerSession {
    gateway: Arc<dyn FileSystemGateway>,
    dialog: Arc<dyn Dialog>,
    options: WalkOptions,
    criteria: SearchDefaults,
    roots: Vec<PathBuf>,
    area: Option<Vec<PathBuf>>,
    last_build: LastBuild,
    model: TreeModel,
    dispatcher: OperationDispatcher,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ExplorerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerSession")
            .field("roots", &self.roots)
            .field("area", &self.area)
            .field("criteria", &self.criteria)
            .field("entries", &self.model.len())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl ExplorerSession {
    /// Create a session with an empty tree
    ///
    /// Must be called within a Tokio runtime (mutations spawn tasks).
    #[must_use]
    pub fn new(
        gateway: Arc<dyn FileSystemGateway>,
        dialog: Arc<dyn Dialog>,
        config: &ExplorerConfig,
    ) -> (Self, ReportReceiver) {
        let (dispatcher, reports) = OperationDispatcher::new(Arc::clone(&gateway));
        let session = Self {
            gateway,
            dialog,
            options: config.walk.clone(),
            criteria: config.search,
            roots: Vec::new(),
            area: None,
            last_build: LastBuild::default(),
            model: TreeModel::new(),
            dispatcher,
            cancel: CancellationToken::new(),
        };
        (session, reports)
    }

    #[must_use]
    pub const fn model(&self) -> &TreeModel {
        &self.model
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Paths a search walks: the explicit area, or the opened roots
    #[must_use]
    pub fn search_area(&self) -> &[PathBuf] {
        self.area.as_deref().unwrap_or(&self.roots)
    }

    #[must_use]
    pub const fn criteria(&self) -> SearchDefaults {
        self.criteria
    }

    /// Token that aborts the next (or current) tree build when cancelled
    #[must_use]
    pub fn cancellation(&mut self) -> CancellationToken {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.cancel.clone()
    }

    async fn build(
        &mut self,
        roots: &[PathBuf],
        criteria: Option<&SearchCriteria>,
    ) -> Result<BuildOutput, ExplorerError> {
        let filter = criteria
            .cloned()
            .map(SearchFilter::new)
            .transpose()?
            .map(|f| f.with_max_content_bytes(self.options.max_content_bytes));

        let builder = TreeBuilder::new(Arc::clone(&self.gateway))
            .with_filter(filter)
            .with_options(self.options.clone())
            .with_cancellation(self.cancellation());
        Ok(builder.build(roots).await?)
    }

    fn replace_tree(&mut self, output: BuildOutput, last_build: LastBuild) -> BuildSummary {
        self.model = TreeModel::from_nodes(output.nodes);
        self.dispatcher.clear_clipboard();
        self.last_build = last_build;
        BuildSummary {
            nodes: self.model.len(),
            failures: output.failures,
            notice: None,
        }
    }

    /// Open directories or files as the new roots
    ///
    /// With `None`, the dialog is asked; a cancelled dialog returns `Ok(None)` and
    /// leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns an `ExplorerError` if the dialog fails or no root can be read.
    pub async fn open(&mut self, paths: Option<Vec<PathBuf>>) -> Result<Option<BuildSummary>, ExplorerError> {
        let paths = match paths {
            Some(paths) if !paths.is_empty() => paths,
            _ => match self.dialog.pick_directory_or_files().await? {
                Some(paths) if !paths.is_empty() => paths,
                _ => {
                    debug!("open cancelled");
                    return Ok(None);
                }
            },
        };

        let output = self.build(&paths, None).await?;
        info!(roots = paths.len(), "opened");
        self.roots.clone_from(&paths);
        self.area = None;
        Ok(Some(self.replace_tree(
            output,
            LastBuild {
                roots: paths,
                criteria: None,
            },
        )))
    }

    /// Choose which criteria the next search uses
    pub fn set_criteria(&mut self, match_name: bool, match_extension: bool, match_content: bool) {
        self.criteria = SearchDefaults {
            match_name,
            match_extension,
            match_content,
        };
    }

    /// Restrict searches to `paths`; an empty list goes back to the opened roots
    pub fn set_search_area(&mut self, paths: Vec<PathBuf>) {
        self.area = (!paths.is_empty()).then_some(paths);
    }

    /// Search the search area and display the matches
    ///
    /// When nothing matches, the displayed tree is kept and the summary carries
    /// [`Notice::NoResults`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyQuery`/`NoCriteria` before any I/O, an
    /// `InvalidInput` error when there is nothing to search, and build errors.
    pub async fn search(&mut self, query: &str) -> Result<BuildSummary, ExplorerError> {
        let criteria = self.criteria.criteria(query.trim());
        criteria.validate()?;

        let area = self.search_area().to_vec();
        if area.is_empty() {
            return Err(ExplorerError::InvalidInput(
                "open a directory or set a search area first".to_string(),
            ));
        }

        let output = self.build(&area, Some(&criteria)).await?;
        if output.nodes.is_empty() {
            info!(query = %criteria.query, "search found nothing");
            return Ok(BuildSummary {
                nodes: 0,
                failures: output.failures,
                notice: Some(Notice::NoResults),
            });
        }

        info!(query = %criteria.query, "search finished");
        Ok(self.replace_tree(
            output,
            LastBuild {
                roots: area,
                criteria: Some(criteria),
            },
        ))
    }

    /// Rebuild the displayed tree from disk with the same roots and filter
    ///
    /// Selection and collapsed folders are carried over by path. A refreshed search
    /// that no longer matches anything keeps the displayed tree and returns
    /// [`Notice::NoResults`], like [`search`](Self::search).
    ///
    /// # Errors
    ///
    /// Returns build errors; the displayed tree is kept on failure.
    pub async fn refresh(&mut self) -> Result<BuildSummary, ExplorerError> {
        let last = self.last_build.clone();
        let mut selected = HashSet::new();
        let mut collapsed = HashSet::new();
        for node in self.all_ids().into_iter().filter_map(|id| self.model.get(id)) {
            if node.selected {
                selected.insert(node.path.clone());
            }
            if node.is_folder() && !node.expanded {
                collapsed.insert(node.path.clone());
            }
        }

        let output = self.build(&last.roots, last.criteria.as_ref()).await?;
        if output.nodes.is_empty() && last.criteria.is_some() {
            info!("refreshed search found nothing");
            return Ok(BuildSummary {
                nodes: 0,
                failures: output.failures,
                notice: Some(Notice::NoResults),
            });
        }
        let summary = self.replace_tree(output, last);
        for id in self.all_ids() {
            let Some(path) = self.model.get(id).map(|n| n.path.clone()) else {
                continue;
            };
            if selected.contains(&path) {
                self.model.set_selected(id, true);
            }
            if collapsed.contains(&path) {
                self.model.set_expanded(id, false);
            }
        }
        Ok(summary)
    }

    fn all_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack: Vec<NodeId> = self.model.roots().to_vec();
        while let Some(id) = stack.pop() {
            ids.push(id);
            stack.extend_from_slice(self.model.children(id));
        }
        ids
    }

    /// Node shown at a 1-based row of the current view
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no such row is visible.
    pub fn node_at(&self, row: usize) -> Result<NodeId, ExplorerError> {
        self.model
            .view()
            .id_at(row)
            .ok_or_else(|| ExplorerError::InvalidInput(format!("no row {row} in the tree")))
    }

    /// Path of a node
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn path_of(&self, id: NodeId) -> Result<&Path, ExplorerError> {
        self.model
            .get(id)
            .map(|node| node.path.as_path())
            .ok_or_else(|| ValidationError::UnknownNode.into())
    }

    /// Set a node's selection flag
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<(), ExplorerError> {
        if self.model.set_selected(id, selected) {
            Ok(())
        } else {
            Err(ValidationError::UnknownNode.into())
        }
    }

    /// Flip a node's selection flag and return the new state
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn toggle_selected(&mut self, id: NodeId) -> Result<bool, ExplorerError> {
        self.model
            .toggle_selected(id)
            .ok_or_else(|| ValidationError::UnknownNode.into())
    }

    /// Expand or collapse a folder
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotAFolder` for files and `UnknownNode` for
    /// missing nodes.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> Result<(), ExplorerError> {
        if self.model.set_expanded(id, expanded) {
            return Ok(());
        }
        let path = self.path_of(id)?.to_path_buf();
        Err(ValidationError::NotAFolder(path).into())
    }

    /// Create a file or folder under `parent`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty/taken name, missing kind or a
    /// non-folder parent.
    pub fn create(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: Option<NodeKind>,
    ) -> Result<(NodeId, OperationId), ExplorerError> {
        Ok(self.dispatcher.create(&mut self.model, parent, name, kind)?)
    }

    /// Delete a node and its subtree
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn delete(&mut self, id: NodeId) -> Result<OperationId, ExplorerError> {
        Ok(self.dispatcher.delete(&mut self.model, id)?)
    }

    /// Put a node on the clipboard for copying
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn copy(&mut self, id: NodeId) -> Result<(), ExplorerError> {
        Ok(self.dispatcher.copy(&self.model, id)?)
    }

    /// Put a node on the clipboard for moving
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if the node is gone.
    pub fn cut(&mut self, id: NodeId) -> Result<(), ExplorerError> {
        Ok(self.dispatcher.cut(&self.model, id)?)
    }

    /// Paste the clipboard node into `destination`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty clipboard, a non-folder
    /// destination or a folder pasted into itself.
    pub async fn paste(&mut self, destination: NodeId) -> Result<(NodeId, OperationId), ExplorerError> {
        let on_disk = self.listing(destination).await;
        Ok(self.dispatcher.paste(&mut self.model, destination, &on_disk)?)
    }

    /// Move `id` into the folder `target`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a non-folder target or a folder dropped
    /// into itself.
    pub async fn drag(&mut self, id: NodeId, target: NodeId) -> Result<OperationId, ExplorerError> {
        let on_disk = self.listing(target).await;
        Ok(self.dispatcher.drag(&mut self.model, id, target, &on_disk)?)
    }

    /// Names on disk in a displayed folder
    ///
    /// Filtered or depth-limited trees do not show every entry, so transfers
    /// check the real listing too. An unreadable folder counts as empty.
    async fn listing(&self, folder: NodeId) -> Vec<String> {
        let Some(path) = self
            .model
            .get(folder)
            .filter(|node| node.is_folder())
            .map(|node| node.path.clone())
        else {
            return Vec::new();
        };
        match self.gateway.list_directory(&path).await {
            Ok(names) => names,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "could not list destination");
                Vec::new()
            }
        }
    }

    /// Copy the selection into `destination` (or a folder picked in the dialog)
    ///
    /// Returns `Ok(None)` when the dialog is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NothingSelected` before asking for a destination,
    /// and a gateway error if the destination folder cannot be created.
    pub async fn export(&mut self, destination: Option<PathBuf>) -> Result<Option<ExportSummary>, ExplorerError> {
        let nodes = SelectionCollector::collect(&self.model.to_file_nodes());
        if nodes.is_empty() {
            return Err(ValidationError::NothingSelected.into());
        }

        let destination = match destination {
            Some(path) => path,
            None => match self.dialog.pick_save_destination().await? {
                Some(path) => path,
                None => return Ok(None),
            },
        };

        info!(entries = nodes.len(), destination = %destination.display(), "exporting selection");
        Ok(Some(export(self.gateway.as_ref(), &nodes, &destination).await?))
    }

    /// Show an entry in the system file manager
    ///
    /// Folders are opened themselves; files open their containing folder.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file manager cannot be launched.
    pub fn reveal(&self, id: NodeId) -> Result<PathBuf, ExplorerError> {
        let node = self.model.get(id).ok_or(ValidationError::UnknownNode)?;
        let target = if node.is_folder() {
            node.path.clone()
        } else {
            node.path.parent().map_or_else(|| node.path.clone(), Path::to_path_buf)
        };
        open::that_detached(&target)?;
        Ok(target)
    }

    /// Current state for the `status` command
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let clipboard = self.dispatcher.clipboard().peek().and_then(|(id, mode)| {
            self.model.get(id).map(|node| (node.path.clone(), mode))
        });
        SessionStatus {
            roots: self.roots.clone(),
            search_area: self.search_area().to_vec(),
            criteria: self.criteria,
            active_query: self.last_build.criteria.as_ref().map(|c| c.query.clone()),
            entries: self.model.len(),
            selected: SelectionCollector::collect(&self.model.to_file_nodes())
                .iter()
                .map(|n| n.count())
                .sum(),
            clipboard,
            in_flight: self.dispatcher.in_flight(),
        }
    }
}
