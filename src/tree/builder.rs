//! Recursive asynchronous tree builder
//!
//! Walks a list of root paths and produces [`FileNode`] trees. Each directory level
//! fans out one stat (and, for folders, one listing) per entry and joins them in
//! input order, so siblings may complete in any order while the emitted children
//! keep the listing order.
//!
//! # Filtering
//!
//! Without a filter every entry is kept. With a [`SearchFilter`]:
//!
//! - a file is kept when it passes every enabled criterion;
//! - a folder whose name matches is kept with its subtree nested beneath it, and
//!   the name criterion is considered satisfied for everything below it;
//! - a folder that does not match is still walked, but its surviving descendants
//!   are flattened into the parent's list and the folder itself is dropped.
//!
//! # Failures
//!
//! A failed stat or listing discards that entry's branch only and is recorded as a
//! [`BuildFailure`]; sibling branches complete normally. The build as a whole fails
//! only when every root failed.

use super::error::TreeError;
use super::filter::SearchFilter;
use super::node::{FileNode, name_of};
use crate::gateway::{FileSystemGateway, GatewayError};
use futures::future::{BoxFuture, FutureExt, join_all};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Knobs for a directory walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Descend into symlinked directories
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Include entries whose name starts with a dot (roots are always included)
    #[serde(default = "default_true")]
    pub show_hidden: bool,
    /// Folders at this depth are listed without children
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Files larger than this are never content-matched
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_max_depth() -> usize {
    64
}

const fn default_max_content_bytes() -> u64 {
    16 * 1024 * 1024
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            show_hidden: default_true(),
            max_depth: default_max_depth(),
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

/// A branch that could not be read
#[derive(Debug)]
pub struct BuildFailure {
    pub path: PathBuf,
    pub error: GatewayError,
}

/// Result of a walk: the trees plus any branches that were dropped
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub nodes: Vec<FileNode>,
    pub failures: Vec<BuildFailure>,
}

impl BuildOutput {
    fn failed(path: PathBuf, error: GatewayError) -> Self {
        warn!(path = %path.display(), error = %error, "dropping unreadable branch");
        Self {
            nodes: Vec::new(),
            failures: vec![BuildFailure { path, error }],
        }
    }

    fn extend(&mut self, other: Self) {
        self.nodes.extend(other.nodes);
        self.failures.extend(other.failures);
    }
}

#[derive(Debug, Clone, Copy)]
struct WalkContext {
    depth: usize,
    name_satisfied: bool,
}

/// Builds [`FileNode`] trees from disk through a [`FileSystemGateway`]
pub struct TreeBuilder {
    gateway: Arc<dyn FileSystemGateway>,
    filter: Option<SearchFilter>,
    options: WalkOptions,
    cancel: CancellationToken,
}

impl TreeBuilder {
    /// A builder with no filter and default walk options
    #[must_use]
    pub fn new(gateway: Arc<dyn FileSystemGateway>) -> Self {
        Self {
            gateway,
            filter: None,
            options: WalkOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Apply a search filter to the walk
    #[must_use]
    pub fn with_filter(mut self, filter: Option<SearchFilter>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Abort the walk when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk `roots` and build one tree per surviving entry
    ///
    /// An empty `roots` list yields an empty output.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::Cancelled` if the cancellation token fires, and
    /// `TreeError::Io` when every root failed to stat or list.
    pub async fn build(&self, roots: &[PathBuf]) -> Result<BuildOutput, TreeError> {
        if roots.is_empty() {
            return Ok(BuildOutput::default());
        }

        let root_ctx = WalkContext {
            depth: 0,
            name_satisfied: false,
        };
        let walks = join_all(roots.iter().map(|root| self.visit(root.clone(), root_ctx)));

        let per_root = tokio::select! {
            () = self.cancel.cancelled() => return Err(TreeError::Cancelled),
            walked = walks => walked,
        };

        let all_roots_failed = roots
            .iter()
            .zip(&per_root)
            .all(|(root, walked)| walked.failures.iter().any(|f| &f.path == root));

        let mut output = BuildOutput::default();
        for walked in per_root {
            output.extend(walked);
        }

        if all_roots_failed && let Some(first) = output.failures.drain(..).next() {
            return Err(TreeError::Io {
                path: first.path,
                source: first.error,
            });
        }

        info!(
            roots = roots.len(),
            nodes = output.nodes.iter().map(FileNode::count).sum::<usize>(),
            failures = output.failures.len(),
            filtered = self.filter.is_some(),
            "tree built"
        );
        Ok(output)
    }

    /// Visit every path of one level concurrently, keeping input order
    fn walk(&self, paths: Vec<PathBuf>, ctx: WalkContext) -> BoxFuture<'_, BuildOutput> {
        async move {
            let visits = paths.into_iter().map(|path| self.visit(path, ctx));
            let mut output = BuildOutput::default();
            for walked in join_all(visits).await {
                output.extend(walked);
            }
            output
        }
        .boxed()
    }

    /// Visit one entry; yields zero nodes (filtered out or failed), one node, or the
    /// flattened descendants of a non-matching folder
    fn visit(&self, path: PathBuf, ctx: WalkContext) -> BoxFuture<'_, BuildOutput> {
        async move {
            if self.cancel.is_cancelled() {
                return BuildOutput::default();
            }

            let name = name_of(&path);
            if ctx.depth > 0 && !self.options.show_hidden && name.starts_with('.') {
                return BuildOutput::default();
            }

            let stat = match self.gateway.stat(&path).await {
                Ok(stat) => stat,
                Err(err) => return BuildOutput::failed(path, err),
            };

            if !stat.is_directory {
                let keep = match &self.filter {
                    None => true,
                    Some(filter) => {
                        filter.matches_file(&name, ctx.name_satisfied)
                            && (!filter.needs_content()
                                || filter
                                    .matches_content(self.gateway.as_ref(), &path, stat.len)
                                    .await)
                    }
                };
                return BuildOutput {
                    nodes: if keep { vec![FileNode::file(path)] } else { Vec::new() },
                    failures: Vec::new(),
                };
            }

            let folder_matches = match &self.filter {
                None => true,
                Some(filter) => ctx.name_satisfied || filter.matches(&name, true),
            };

            let descend = (!stat.is_symlink || self.options.follow_symlinks)
                && ctx.depth < self.options.max_depth;

            let inner = if descend {
                let names = match self.gateway.list_directory(&path).await {
                    Ok(names) => names,
                    Err(err) => return BuildOutput::failed(path, err),
                };
                debug!(path = %path.display(), entries = names.len(), "listed directory");
                let child_paths = names.iter().map(|entry| path.join(entry)).collect();
                self.walk(
                    child_paths,
                    WalkContext {
                        depth: ctx.depth + 1,
                        name_satisfied: folder_matches && self.filter.is_some(),
                    },
                )
                .await
            } else {
                debug!(path = %path.display(), symlink = stat.is_symlink, "not descending");
                BuildOutput::default()
            };

            if folder_matches {
                BuildOutput {
                    nodes: vec![FileNode::folder(path, inner.nodes)],
                    failures: inner.failures,
                }
            } else {
                inner
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayOp, MemoryGateway};
    use crate::tree::{NodeKind, SearchCriteria};
    use std::path::Path;
    use std::time::Duration;

    fn builder(gateway: MemoryGateway) -> TreeBuilder {
        TreeBuilder::new(Arc::new(gateway))
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    fn names(nodes: &[FileNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_roots() {
        let output = builder(MemoryGateway::new()).build(&[]).await.unwrap();
        assert!(output.nodes.is_empty());
        assert!(output.failures.is_empty());
    }

    #[tokio::test]
    async fn test_docs_and_notes_scenario() {
        let gateway = MemoryGateway::new()
            .with_file("/root/docs/x.txt", "x")
            .with_file("/root/notes.txt", "n");

        let output = builder(gateway)
            .build(&paths(&["/root/docs", "/root/notes.txt"]))
            .await
            .unwrap();

        assert_eq!(
            output.nodes,
            vec![
                FileNode::folder("/root/docs", vec![FileNode::file("/root/docs/x.txt")]),
                FileNode::file("/root/notes.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_folder_has_empty_children() {
        let gateway = MemoryGateway::new().with_dir("/empty");
        let output = builder(gateway).build(&paths(&["/empty"])).await.unwrap();
        assert_eq!(output.nodes[0].kind, NodeKind::Folder);
        assert_eq!(output.nodes[0].children, Some(vec![]));
    }

    #[tokio::test]
    async fn test_order_preserved_despite_completion_order() {
        let gateway = MemoryGateway::new()
            .with_file("/d/slow.txt", "")
            .with_file("/d/fast.txt", "")
            .with_file("/d/medium.txt", "")
            .with_delay("/d/slow.txt", Duration::from_millis(40))
            .with_delay("/d/medium.txt", Duration::from_millis(20));

        let output = builder(gateway).build(&paths(&["/d"])).await.unwrap();
        assert_eq!(
            names(output.nodes[0].children()),
            vec!["slow.txt", "fast.txt", "medium.txt"]
        );
    }

    #[tokio::test]
    async fn test_failed_branch_keeps_siblings() {
        let gateway = MemoryGateway::new()
            .with_file("/d/ok/a.txt", "")
            .with_file("/d/bad/b.txt", "")
            .with_file("/d/c.txt", "");
        gateway.fail_on(GatewayOp::List, "/d/bad");

        let output = builder(gateway).build(&paths(&["/d"])).await.unwrap();
        let root = &output.nodes[0];
        assert_eq!(names(root.children()), vec!["ok", "c.txt"]);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].path, Path::new("/d/bad"));
    }

    #[tokio::test]
    async fn test_all_roots_failing_is_an_error() {
        let result = builder(MemoryGateway::new())
            .build(&paths(&["/missing"]))
            .await;
        assert!(matches!(result, Err(TreeError::Io { .. })));
    }

    #[tokio::test]
    async fn test_one_root_failing_keeps_the_other() {
        let gateway = MemoryGateway::new().with_file("/present.txt", "");
        let output = builder(gateway)
            .build(&paths(&["/missing", "/present.txt"]))
            .await
            .unwrap();
        assert_eq!(names(&output.nodes), vec!["present.txt"]);
        assert_eq!(output.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_name_filter_flattens_non_matching_folders() {
        let gateway = MemoryGateway::new()
            .with_file("/r/a/report-1.txt", "")
            .with_file("/r/a/b/Report2024.txt", "")
            .with_file("/r/a/invoice.txt", "");
        let filter = SearchFilter::new(SearchCriteria::name("report")).unwrap();

        let output = builder(gateway)
            .with_filter(Some(filter))
            .build(&paths(&["/r"]))
            .await
            .unwrap();

        assert_eq!(names(&output.nodes), vec!["report-1.txt", "Report2024.txt"]);
        assert!(output.nodes.iter().all(|n| n.kind == NodeKind::File));
    }

    #[tokio::test]
    async fn test_matching_folder_kept_intact() {
        let gateway = MemoryGateway::new()
            .with_file("/r/reports/q1.txt", "")
            .with_file("/r/reports/old/q0.txt", "")
            .with_file("/r/other.txt", "");
        let filter = SearchFilter::new(SearchCriteria::name("reports")).unwrap();

        let output = builder(gateway)
            .with_filter(Some(filter))
            .build(&paths(&["/r"]))
            .await
            .unwrap();

        assert_eq!(output.nodes.len(), 1);
        let reports = &output.nodes[0];
        assert_eq!(reports.name, "reports");
        assert_eq!(names(reports.children()), vec!["q1.txt", "old"]);
        assert_eq!(names(reports.children()[1].children()), vec!["q0.txt"]);
    }

    #[tokio::test]
    async fn test_extension_filter() {
        let gateway = MemoryGateway::new()
            .with_file("/r/a.pdf", "")
            .with_file("/r/a.docx", "");
        let filter = SearchFilter::new(SearchCriteria::extension("x.pdf")).unwrap();

        let output = builder(gateway)
            .with_filter(Some(filter))
            .build(&paths(&["/r"]))
            .await
            .unwrap();
        assert_eq!(names(&output.nodes), vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn test_content_filter() {
        let gateway = MemoryGateway::new()
            .with_file("/r/a.txt", "TODO: fix")
            .with_file("/r/b.txt", "nothing here");
        let filter = SearchFilter::new(SearchCriteria::content("TODO")).unwrap();

        let output = builder(gateway)
            .with_filter(Some(filter))
            .build(&paths(&["/r"]))
            .await
            .unwrap();
        assert_eq!(names(&output.nodes), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_hidden_entries_skipped_when_configured() {
        let gateway = MemoryGateway::new()
            .with_file("/r/.git/config", "")
            .with_file("/r/main.rs", "");
        let options = WalkOptions {
            show_hidden: false,
            ..WalkOptions::default()
        };

        let output = builder(gateway)
            .with_options(options)
            .build(&paths(&["/r"]))
            .await
            .unwrap();
        assert_eq!(names(output.nodes[0].children()), vec!["main.rs"]);
    }

    #[tokio::test]
    async fn test_max_depth_lists_folder_without_children() {
        let gateway = MemoryGateway::new().with_file("/r/a/b/c.txt", "");
        let options = WalkOptions {
            max_depth: 1,
            ..WalkOptions::default()
        };

        let output = builder(gateway)
            .with_options(options)
            .build(&paths(&["/r"]))
            .await
            .unwrap();
        let a = &output.nodes[0].children()[0];
        assert_eq!(a.name, "a");
        assert_eq!(a.children, Some(vec![]));
    }

    #[tokio::test]
    async fn test_cancelled_walk() {
        let gateway = MemoryGateway::new()
            .with_file("/r/slow.txt", "")
            .with_delay("/r/slow.txt", Duration::from_millis(200));
        let token = CancellationToken::new();
        let builder = builder(gateway).with_cancellation(token.clone());
        let roots = paths(&["/r"]);

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(builder.build(&roots), canceller);
        assert!(matches!(result, Err(TreeError::Cancelled)));
    }
}
