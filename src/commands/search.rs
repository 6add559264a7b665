//! Search command - print the entries matching a query

use super::CommandContext;
use crate::ExplorerError;
use crate::config::SearchDefaults;
use crate::output::{self, render_nodes};
use crate::session::Notice;
use crate::tree::{SearchFilter, TreeBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type Result<T> = std::result::Result<T, ExplorerError>;

/// Parameters of one search
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    /// Where to search; empty means the current directory
    pub paths: Vec<PathBuf>,
    pub criteria: SearchDefaults,
    pub json: bool,
}

/// Execute the search command
///
/// The query is validated before anything is read from disk.
///
/// # Errors
/// Returns an error for an empty query, no active criteria, unreadable search
/// paths or a failed JSON serialization
pub async fn execute(ctx: &CommandContext<'_>, params: SearchParams, cancel: CancellationToken) -> Result<()> {
    let criteria = params.criteria.criteria(params.query.trim());
    let filter = SearchFilter::new(criteria)?.with_max_content_bytes(ctx.config.walk.max_content_bytes);

    let paths = if params.paths.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        params.paths
    };
    debug!(query = %params.query, paths = paths.len(), "searching");

    let built = TreeBuilder::new(Arc::clone(ctx.gateway))
        .with_filter(Some(filter))
        .with_options(ctx.config.walk.clone())
        .with_cancellation(cancel)
        .build(&paths)
        .await?;

    ctx.warn_failures(&built.failures);
    if params.json {
        ctx.output.write(&output::to_json(&built.nodes)?);
    } else if built.nodes.is_empty() {
        ctx.output.info(&Notice::NoResults.to_string());
    } else {
        ctx.output.write(render_nodes(&built.nodes, ctx.style).trim_end());
    }
    Ok(())
}
