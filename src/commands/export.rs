//! Export command - copy whole paths into a destination folder

use super::CommandContext;
use crate::ExplorerError;
use crate::output::format_path;
use crate::selection::{ExportSummary, SelectionCollector, export};
use crate::tree::FileNode;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, ExplorerError>;

/// Execute the export command
///
/// Every path is exported whole, as if its entry were selected in a tree.
///
/// # Errors
/// Returns an error if a source path cannot be read or the destination folder
/// cannot be created
pub async fn execute(ctx: &CommandContext<'_>, dest: &Path, paths: &[PathBuf]) -> Result<()> {
    let mut roots = Vec::with_capacity(paths.len());
    for path in paths {
        let stat = ctx.gateway.stat(path).await?;
        let mut node = if stat.is_directory {
            FileNode::folder(path.clone(), Vec::new())
        } else {
            FileNode::file(path.clone())
        };
        node.selected = true;
        roots.push(node);
    }

    let nodes = SelectionCollector::collect(&roots);
    let summary = export(ctx.gateway.as_ref(), &nodes, dest).await?;
    report_summary(ctx, &summary);
    Ok(())
}

/// Print one line per copied entry and per failure
pub(crate) fn report_summary(ctx: &CommandContext<'_>, summary: &ExportSummary) {
    for copied in &summary.copied {
        ctx.output
            .success(&format!("exported {}", format_path(copied, ctx.style.path_format)));
    }
    for (path, err) in &summary.failures {
        ctx.output.error(&format!(
            "could not export {}: {err}",
            format_path(path, ctx.style.path_format)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::gateway::{FileSystemGateway, GatewayOp, MemoryGateway};
    use crate::output::TreeStyle;
    use crate::ui::{BufferedWriter, MessageLevel};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_export_paths_with_collision() {
        let memory = Arc::new(
            MemoryGateway::new()
                .with_file("/src/a.txt", "a")
                .with_file("/src/docs/b.txt", "b")
                .with_file("/out/a.txt", "old"),
        );
        let gateway: Arc<dyn FileSystemGateway> = memory.clone();
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        execute(&ctx, Path::new("/out"), &["/src/a.txt".into(), "/src/docs".into()])
            .await
            .unwrap();

        assert_eq!(memory.read_string("/out/a.txt").as_deref(), Some("old"));
        assert_eq!(memory.read_string("/out/a (1).txt").as_deref(), Some("a"));
        assert!(memory.exists("/out/docs/b.txt"));
        assert_eq!(out.at_level(MessageLevel::Success).len(), 2);
    }

    #[tokio::test]
    async fn test_export_reports_failures() {
        let memory = Arc::new(
            MemoryGateway::new()
                .with_file("/src/a.txt", "a")
                .with_file("/src/b.txt", "b"),
        );
        memory.fail_on(GatewayOp::CopyFile, "/src/a.txt");
        let gateway: Arc<dyn FileSystemGateway> = memory.clone();
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        execute(&ctx, Path::new("/out"), &["/src/a.txt".into(), "/src/b.txt".into()])
            .await
            .unwrap();

        assert!(memory.exists("/out/b.txt"));
        assert_eq!(out.at_level(MessageLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let gateway: Arc<dyn FileSystemGateway> = Arc::new(MemoryGateway::new());
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        let result = execute(&ctx, Path::new("/out"), &["/nope".into()]).await;
        assert!(matches!(result, Err(ExplorerError::Gateway(_))));
    }
}
